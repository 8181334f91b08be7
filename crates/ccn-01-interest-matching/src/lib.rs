//! # CCN-01 Interest Matching
//!
//! Names, exclude filters, Interests and the predicate that decides whether
//! a piece of content satisfies an Interest. Every other component of the
//! client (transport, caching, versioned retrieval) depends on this
//! predicate.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `Name`: Immutable sequence of binary components
//!   - `ExcludeFilter`: Sorted set of excluded components and ranges
//!   - `Interest`: Name plus optional constraints, with factories
//!   - `ContentObject`: Named content with implicit digest
//!   - Matching predicate (`Interest::matches_content_with`)
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `InterestMatchingApi`: Driving port (inbound API)
//!   - `TrustManager`: Driven port (publisher role checks)
//!
//! - **Service Layer** (`service/`): `InterestMatcher` implements
//!   `InterestMatchingApi` over an injected `TrustManager`
//!
//! - **Adapters Layer** (`adapters/`): `ExactKeyTrustManager`
//!
//! - **Codec** (`codec/`): Tag/length/close wire form of Interests
//!
//! ## Invariants
//!
//! - Non-matches are `false`, never errors
//! - `is_prefix_of(b, k)` is false whenever `k` exceeds either name's length
//! - A component in an exclude filter is always excluded, one absent never is
//! - Interest equality compares every field, byte arrays by content
//!
//! ## Usage Example
//!
//! ```
//! use ccn_01_interest_matching::{ContentObject, Interest, InterestMatcher, InterestMatchingApi, Name};
//!
//! let matcher = InterestMatcher::default();
//! let interest = Interest::next(Name::from_uri("/parc/videos/v1").unwrap());
//! let content = ContentObject::unsigned(Name::from_uri("/parc/videos/v2").unwrap(), b"frame".to_vec());
//! assert!(matcher.matches_content(&interest, &content));
//! ```

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::ExactKeyTrustManager;
pub use codec::{WireDecoder, WireEncodable, WireEncoder};
pub use domain::{
    component_to_uri, AnswerOriginKind, Component, ContentObject, Digest, ExcludeElement,
    ExcludeFilter, Interest, Name, OrderPreference, PublisherId, PublisherKind,
    PublisherPublicKeyDigest, PUBLISHER_ID_LEN, URI_SCHEME,
};
pub use error::{CodecError, ExcludeError, NameError};
pub use ports::{InterestMatchingApi, TrustManager};
pub use service::InterestMatcher;
