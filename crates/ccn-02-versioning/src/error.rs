//! Error types for the versioning subsystem

use ccn_01_interest_matching::ExcludeError;
use thiserror::Error;

/// A name component that is not a version
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("No component at index {index}")]
    MissingComponent { index: usize },

    #[error("Component is not a version: marker {marker:?}, {len} bytes")]
    NotAVersion { marker: Option<u8>, len: usize },

    #[error("Version ticks {ticks} exceed the 48-bit range")]
    OutOfRange { ticks: u64 },
}

/// Failures reported by the Interest transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport is closed")]
    Closed,

    #[error("Interest rejected: {0}")]
    Rejected(String),

    #[error("Transport I/O error: {0}")]
    Io(String),
}

/// A listener could not process delivered content
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Listener failed: {0}")]
pub struct ListenerError(pub String);

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        ListenerError(message.to_string())
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        ListenerError(message)
    }
}

/// Errors surfaced by the manager and the registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersioningError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Cannot build exclude filter: {0}")]
    Exclude(#[from] ExcludeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
