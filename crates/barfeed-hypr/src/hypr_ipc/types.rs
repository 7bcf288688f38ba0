//! Event records read from the Hyprland event socket
//!
//! Hyprland writes one event per line as `NAME>>PAYLOAD`. The payload is
//! free-form text whose comma-separated layout depends on the event, so it
//! is kept verbatim.

use std::str::FromStr;

use serde::Serialize;

use super::HyprError;

/// One parsed event line
///
/// Serializes as `{"event": name, "data": payload}`.
///
/// # Example
///
/// ```ignore
/// let record: EventRecord = "workspace>>2".parse()?;
/// assert_eq!(record.name, "workspace");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Event name, e.g. `workspace` or `activewindow`
    #[serde(rename = "event")]
    pub name: String,

    /// Everything after the first `>>`, may itself contain `>>`
    #[serde(rename = "data")]
    pub payload: String,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl FromStr for EventRecord {
    type Err = HyprError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim_end();
        match trimmed.split_once(">>") {
            Some((name, payload)) => Ok(Self::new(name, payload)),
            None => Err(HyprError::MalformedEvent {
                line: trimmed.to_string(),
            }),
        }
    }
}
