//! iwd integration for the wifi poller
//!
//! This module turns iwd's D-Bus object model into per-device snapshots:
//! - Fetch every object with `GetManagedObjects`
//! - Fold the flat path map into a tree (`tree`)
//! - Walk adapters and devices and resolve each station's ranked networks
//!   (`snapshot`)
//!
//! ## Architecture
//!
//! - `IwdBackend`: the three bus calls the projection needs
//! - `IwdClient`: `IwdBackend` over the system bus
//! - `TreeNode` / `build`: path tree, rebuilt every poll
//! - `project`: tree -> `Vec<State>`

mod error;
mod snapshot;
mod source;
mod tree;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SnapshotError;
pub use snapshot::{project, ProjectOptions};
pub use source::{IwdBackend, IwdClient};
pub use tree::build;
pub use types::State;
