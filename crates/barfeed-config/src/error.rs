use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse KDL")]
    #[diagnostic(code(barfeed::config::parse_error))]
    ParseError {
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source]
        source: kdl::KdlError,
    },

    #[error("Invalid value for `{node}`: expected {expected}")]
    #[diagnostic(code(barfeed::config::invalid_value))]
    InvalidValue { node: String, expected: &'static str },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(barfeed::config::invalid))]
    Invalid { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
