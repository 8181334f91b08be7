//! Domain layer: names, exclude filters, Interests and the matching predicate
//!
//! Pure data and logic. No I/O, no locks.

pub mod content;
pub mod exclude;
pub mod interest;
pub mod matching;
pub mod name;
pub mod publisher;

pub use content::ContentObject;
pub use exclude::{ExcludeElement, ExcludeFilter};
pub use interest::{AnswerOriginKind, Interest, OrderPreference};
pub use name::{component_to_uri, Component, Name, URI_SCHEME};
pub use publisher::{Digest, PublisherId, PublisherKind, PublisherPublicKeyDigest, PUBLISHER_ID_LEN};
