//! Cross-crate integration flows

pub mod matching;
pub mod versioning;
