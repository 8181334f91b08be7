//! Ports layer: trait definitions for the matching subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::InterestMatchingApi;
pub use outbound::TrustManager;
