//! Configuration data model

use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub global: GlobalConfig,
    pub wifi: WifiConfig,
    pub hyprland: HyprlandConfig,
}

/// Global settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Settings for the iwd snapshot poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfig {
    /// D-Bus well-known name of the network service
    pub service: String,
    /// Object path under which adapters are published
    pub namespace: String,
    /// Delay between the end of one poll and the start of the next
    pub interval: Duration,
    /// Attach iwd's known networks to every device snapshot
    pub known_networks: bool,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            service: "net.connman.iwd".to_string(),
            namespace: "/net/connman/iwd".to_string(),
            interval: Duration::from_secs(1),
            known_networks: false,
        }
    }
}

/// Settings for the Hyprland control client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyprlandConfig {
    /// Program invoked for one-shot JSON queries
    pub hyprctl: String,
    /// Explicit event socket path; derived from the environment when unset
    pub event_socket: Option<PathBuf>,
}

impl Default for HyprlandConfig {
    fn default() -> Self {
        Self {
            hyprctl: "hyprctl".to_string(),
            event_socket: None,
        }
    }
}
