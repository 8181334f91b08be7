//! Outbound Ports (Driven Ports)
//!
//! Collaborators the matching predicate depends on but does not own.

use crate::domain::publisher::{PublisherId, PublisherPublicKeyDigest};

/// Trust decisions for publisher requirements (Driven Port)
///
/// The predicate hands the final publisher check to this trait. Its answer
/// is the verdict for that step.
pub trait TrustManager: Send + Sync {
    /// Does `candidate` satisfy the role or identity named by `required`?
    fn matches_role(&self, required: &PublisherId, candidate: &PublisherPublicKeyDigest) -> bool;
}
