//! Property tests

pub mod matching;
