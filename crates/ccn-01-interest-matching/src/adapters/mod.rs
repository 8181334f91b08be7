//! Adapters layer: concrete collaborators

pub mod exact_key;

pub use exact_key::ExactKeyTrustManager;
