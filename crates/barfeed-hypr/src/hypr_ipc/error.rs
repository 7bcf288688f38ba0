//! Error types for Hyprland IPC operations

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur when talking to the Hyprland compositor
#[derive(Debug, Error)]
pub enum HyprError {
    /// XDG_RUNTIME_DIR is not set
    #[error("XDG_RUNTIME_DIR environment variable not set")]
    RuntimeDirNotSet,

    /// HYPRLAND_INSTANCE_SIGNATURE is not set
    #[error("HYPRLAND_INSTANCE_SIGNATURE environment variable not set - is Hyprland running?")]
    SignatureNotSet,

    /// The socket path does not exist
    #[error("Hyprland event socket not found at {path}")]
    SocketNotFound { path: PathBuf },

    /// Failed to connect to the event socket
    #[error("Failed to connect to Hyprland event socket at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the event socket failed
    #[error("Failed to receive event from Hyprland: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// A line on the event socket had no `>>` delimiter
    #[error("Malformed event line: {line:?}")]
    MalformedEvent { line: String },

    /// Writing an outbound message failed
    #[error("Failed to send message: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Failed to serialize an outbound message
    #[error("Failed to serialize message: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Query output was not valid JSON
    #[error("Failed to deserialize query output: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// The query program could not be started
    #[error("Failed to run {program}: {source}")]
    QuerySpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The query program exited unsuccessfully
    #[error("Query {command:?} failed: {status}")]
    QueryFailed { command: String, status: ExitStatus },

    /// The event reader task panicked or was aborted
    #[error("Event reader task failed: {0}")]
    ReaderTaskFailed(#[source] tokio::task::JoinError),
}
