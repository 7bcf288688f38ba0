//! Hyprland IPC for compositor integration
//!
//! This module provides the two channels barfeed uses to talk to Hyprland:
//! - Subscribe to the event socket and read `NAME>>PAYLOAD` records
//! - Run one-shot JSON queries through `hyprctl -j`
//!
//! ## Architecture
//!
//! - `EventStream`: async sequence of `EventRecord`s from a connection
//! - `EventDispatcher`: moves an `EventStream` onto a reader task
//! - `HyprClient`: runs queries
//! - `HyprError`: error types for IPC operations
//!
//! ## Protocol
//!
//! The event socket lives at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
//! It is write-only from Hyprland's side; clients just read lines.

mod client;
mod error;
mod events;
mod types;

pub use client::{resolve_socket_path, HyprClient};
pub use error::HyprError;
pub use events::{EventDispatcher, EventReceiver, EventStream, DEFAULT_CHANNEL_BUFFER};
pub use types::EventRecord;
