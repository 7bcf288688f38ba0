//! Error types for iwd polling

use thiserror::Error;

/// Errors raised while navigating the object path tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// An expected namespace prefix has no node in the tree
    #[error("Object namespace {path} not found - is iwd running?")]
    MissingNamespace { path: String },
}

/// Errors from the D-Bus side of the poller
#[derive(Debug, Error)]
pub enum IwdError {
    /// Could not open a connection to the system bus
    #[error("Failed to connect to the system bus: {0}")]
    ConnectionFailed(#[source] zbus::Error),

    /// `GetManagedObjects` failed
    #[error("Failed to list iwd objects: {0}")]
    ObjectManager(#[from] zbus::fdo::Error),

    /// A station method call failed
    #[error("{method} on {device} failed: {source}")]
    Call {
        method: &'static str,
        device: String,
        #[source]
        source: zbus::Error,
    },
}

impl IwdError {
    /// Whether the bus connection itself is gone
    ///
    /// Transport failures end the poller; everything else only costs one
    /// cycle.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) => true,
            Self::ObjectManager(zbus::fdo::Error::ZBus(source)) | Self::Call { source, .. } => {
                matches!(source, zbus::Error::InputOutput(_))
            }
            Self::ObjectManager(_) => false,
        }
    }
}

/// Errors that abort a single snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// An object with a capability marker lacks a property we rely on
    #[error("{path} is missing {interface}.{property}")]
    MissingProperty {
        path: String,
        interface: String,
        property: &'static str,
    },

    /// A property has an unexpected D-Bus type
    #[error("{path} has {interface}.{property} of the wrong type, expected {expected}")]
    PropertyType {
        path: String,
        interface: String,
        property: &'static str,
        expected: &'static str,
    },

    /// A ranked network has no matching object
    #[error("{path} does not expose {interface}")]
    MissingObject {
        path: String,
        interface: &'static str,
    },

    #[error(transparent)]
    Source(#[from] IwdError),
}
