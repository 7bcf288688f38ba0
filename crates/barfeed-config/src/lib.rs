//! Configuration parsing for barfeed
//!
//! This crate handles parsing the optional KDL configuration file shared by
//! the `barfeed-wifi` poller and the `barfeed-hypr` compositor client.

mod error;
mod model;
mod parser;

pub use error::ConfigError;
pub use model::*;
pub use parser::{load_config, parse_config, parse_config_str};

/// Configuration path used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/barfeed/config.kdl";
