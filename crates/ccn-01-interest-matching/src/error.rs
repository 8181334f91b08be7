//! Error types for the Interest matching subsystem
//!
//! A non-match is never an error: the predicate returns `false`. These types
//! cover malformed caller input and wire codec failures only.

use thiserror::Error;

/// Errors raised while parsing a name from its URI form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("Invalid percent escape at byte {position} in {uri}")]
    InvalidEscape { uri: String, position: usize },

    #[error("Relative component '{component}' is not allowed in {uri}")]
    RelativeComponent { uri: String, component: String },
}

/// Errors raised when an exclude filter is built from illegal input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExcludeError {
    #[error("Exclude components out of order at element {index}")]
    Unsorted { index: usize },

    #[error("Duplicate exclude component at element {index}")]
    Duplicate { index: usize },

    #[error("Adjacent range markers at element {index}")]
    AdjacentRanges { index: usize },
}

/// Errors from the wire codec
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Input truncated while reading {context}")]
    Truncated { context: &'static str },

    #[error("Unexpected tag 0x{found:02x}, expected {expected}")]
    UnexpectedTag { expected: &'static str, found: u8 },

    #[error("Interest element has no Name")]
    MissingName,

    #[error("Cannot encode Interest: {field} {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Integer element {element} does not fit: {len} bytes")]
    IntegerOverflow { element: &'static str, len: usize },

    #[error("Publisher id must be {expected} bytes, got {found}")]
    InvalidPublisherId { expected: usize, found: usize },

    #[error("Invalid exclude filter: {0}")]
    InvalidExclude(#[from] ExcludeError),

    #[error("Length prefix overflows: {0}")]
    InvalidLength(u64),

    #[error("{remaining} bytes left after the closing marker")]
    TrailingData { remaining: usize },
}
