//! Service layer: the matcher bound to a trust manager

pub mod matcher;

pub use matcher::InterestMatcher;
