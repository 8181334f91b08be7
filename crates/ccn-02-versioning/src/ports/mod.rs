//! Ports layer: trait definitions for versioned retrieval

pub mod inbound;
pub mod outbound;

pub use inbound::{ContentListener, SharedListener, VersioningApi};
pub use outbound::{ContentHandler, InterestTransport};
