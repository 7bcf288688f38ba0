//! Hyprland socket discovery and `hyprctl` queries
//!
//! Hyprland publishes its event socket under the runtime directory, keyed by
//! the instance signature of the running compositor. One-shot queries do not
//! use a socket of their own here; they go through `hyprctl -j`, which
//! already knows how to find the request socket and speaks its framing.

use std::env;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use barfeed_config::HyprlandConfig;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use super::HyprError;

/// Environment variable holding the per-user runtime directory
const RUNTIME_DIR_ENV: &str = "XDG_RUNTIME_DIR";

/// Environment variable identifying the running Hyprland instance
const SIGNATURE_ENV: &str = "HYPRLAND_INSTANCE_SIGNATURE";

/// File name of the event socket inside the instance directory
const EVENT_SOCKET_NAME: &str = ".socket2.sock";

/// Discover the Hyprland event socket from the environment
///
/// Builds `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`
/// and checks that it exists.
///
/// # Errors
///
/// Returns `HyprError::RuntimeDirNotSet` or `HyprError::SignatureNotSet` if
/// either variable is missing or empty.
/// Returns `HyprError::SocketNotFound` if the path doesn't exist.
pub fn get_socket_path() -> Result<PathBuf, HyprError> {
    let runtime_dir = env::var_os(RUNTIME_DIR_ENV)
        .filter(|value| !value.is_empty())
        .ok_or(HyprError::RuntimeDirNotSet)?;
    let signature = env::var_os(SIGNATURE_ENV)
        .filter(|value| !value.is_empty())
        .ok_or(HyprError::SignatureNotSet)?;

    let socket_path = PathBuf::from(runtime_dir)
        .join("hypr")
        .join(signature)
        .join(EVENT_SOCKET_NAME);

    ensure_exists(socket_path)
}

/// Event socket to use: the configured override, else the discovered one
pub fn resolve_socket_path(config: &HyprlandConfig) -> Result<PathBuf, HyprError> {
    match &config.event_socket {
        Some(path) => ensure_exists(path.clone()),
        None => get_socket_path(),
    }
}

fn ensure_exists(path: PathBuf) -> Result<PathBuf, HyprError> {
    if !path.exists() {
        return Err(HyprError::SocketNotFound { path });
    }
    Ok(path)
}

/// Runs compositor queries through `hyprctl`
#[derive(Debug, Clone)]
pub struct HyprClient {
    /// Program invoked for queries
    program: String,
}

impl HyprClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &HyprlandConfig) -> Self {
        Self::new(config.hyprctl.clone())
    }

    /// Run `<hyprctl> -j <command>` and decode its stdout as JSON
    ///
    /// The child's stderr is passed through so `hyprctl`'s own diagnostics
    /// reach the terminal.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::QuerySpawnFailed` if the program cannot be run.
    /// Returns `HyprError::QueryFailed` if it exits unsuccessfully.
    /// Returns `HyprError::DeserializeFailed` if stdout is not JSON.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = HyprClient::new("hyprctl");
    /// let monitors = client.query("monitors").await?;
    /// ```
    pub async fn query(&self, command: &str) -> Result<Value, HyprError> {
        debug!(program = %self.program, command, "Running Hyprland query");

        let output = Command::new(&self.program)
            .arg("-j")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| HyprError::QuerySpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        decode_query_output(command, output.status, &output.stdout)
    }
}

/// Turn a finished query into its JSON result
fn decode_query_output(
    command: &str,
    status: ExitStatus,
    stdout: &[u8],
) -> Result<Value, HyprError> {
    if !status.success() {
        return Err(HyprError::QueryFailed {
            command: command.to_string(),
            status,
        });
    }

    serde_json::from_slice(stdout).map_err(HyprError::DeserializeFailed)
}
