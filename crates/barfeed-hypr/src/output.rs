//! Outbound messages for the status bar
//!
//! Everything written here is one line per message: the consumer on the
//! other end of stdout splits on `\n` and nothing else.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

use crate::hypr_ipc::HyprError;

/// A message to emit
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Free text; embedded newlines are flattened to spaces
    Text(String),
    /// Structured value, written as compact JSON
    Json(Value),
}

impl OutboundMessage {
    /// Render as a single line without the trailing newline
    pub fn to_line(&self) -> Result<String, HyprError> {
        match self {
            Self::Text(text) => Ok(text.replace('\n', " ")),
            Self::Json(value) => serde_json::to_string(value).map_err(HyprError::SerializeFailed),
        }
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Line writer; every message is flushed as soon as it is written
#[derive(Debug)]
pub struct OutboundWriter<W> {
    out: W,
}

impl OutboundWriter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> OutboundWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write `message` and a newline, then flush. No reply is read.
    pub async fn send(&mut self, message: impl Into<OutboundMessage>) -> Result<(), HyprError> {
        let line = message.into().to_line()?;
        self.write_line(line).await
    }

    /// Serialize any value as one compact JSON line
    pub async fn send_json<T: Serialize>(&mut self, value: &T) -> Result<(), HyprError> {
        let line = serde_json::to_string(value).map_err(HyprError::SerializeFailed)?;
        self.write_line(line).await
    }

    async fn write_line(&mut self, mut line: String) -> Result<(), HyprError> {
        line.push('\n');
        self.out
            .write_all(line.as_bytes())
            .await
            .map_err(HyprError::SendFailed)?;
        self.out.flush().await.map_err(HyprError::SendFailed)
    }
}
