//! KDL configuration parser

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::*;

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config_str(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl reports spans with an older miette, so rebuild the span from offset/len
        let offset = e.span.offset();
        let len = e.span.len();
        let span = miette::SourceSpan::from((offset, len));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "global" => {
                config.global = parse_global(node)?;
            }
            "wifi" => {
                config.wifi = parse_wifi(node)?;
            }
            "hyprland" => {
                config.hyprland = parse_hyprland(node)?;
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

fn parse_global(node: &kdl::KdlNode) -> Result<GlobalConfig, ConfigError> {
    let mut global = GlobalConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "log-level" => {
                    let val = string_arg(child)?;
                    global.log_level = val
                        .parse()
                        .map_err(|message| ConfigError::Invalid { message })?;
                }
                name => {
                    tracing::warn!("Unknown global config option: {}", name);
                }
            }
        }
    }

    Ok(global)
}

fn parse_wifi(node: &kdl::KdlNode) -> Result<WifiConfig, ConfigError> {
    let mut wifi = WifiConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "service" => {
                    wifi.service = string_arg(child)?.to_string();
                }
                "namespace" => {
                    let namespace = string_arg(child)?;
                    if !namespace.starts_with('/') {
                        return Err(ConfigError::Invalid {
                            message: format!(
                                "wifi namespace '{}' must be an absolute object path",
                                namespace
                            ),
                        });
                    }
                    wifi.namespace = namespace.to_string();
                }
                "interval-ms" => {
                    let millis = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_i64())
                        .filter(|ms| *ms > 0)
                        .ok_or_else(|| invalid_value(child, "a positive integer"))?;
                    wifi.interval = Duration::from_millis(millis as u64);
                }
                "known-networks" => {
                    wifi.known_networks = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_bool())
                        .ok_or_else(|| invalid_value(child, "a boolean"))?;
                }
                name => {
                    tracing::warn!("Unknown wifi config option: {}", name);
                }
            }
        }
    }

    Ok(wifi)
}

fn parse_hyprland(node: &kdl::KdlNode) -> Result<HyprlandConfig, ConfigError> {
    let mut hyprland = HyprlandConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "hyprctl" => {
                    hyprland.hyprctl = shellexpand::tilde(string_arg(child)?).into_owned();
                }
                "event-socket" => {
                    let path = string_arg(child)?;
                    hyprland.event_socket = Some(shellexpand::tilde(path).into_owned().into());
                }
                name => {
                    tracing::warn!("Unknown hyprland config option: {}", name);
                }
            }
        }
    }

    Ok(hyprland)
}

/// First argument of `node` as a string
fn string_arg(node: &kdl::KdlNode) -> Result<&str, ConfigError> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| invalid_value(node, "a string"))
}

fn invalid_value(node: &kdl::KdlNode, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        node: node.name().value().to_string(),
        expected,
    }
}
