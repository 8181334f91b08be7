//! Inbound Ports (Driving Ports)
//!
//! The API other components use to test content against Interests.

use crate::domain::content::ContentObject;
use crate::domain::interest::Interest;
use crate::domain::name::Name;
use crate::domain::publisher::PublisherPublicKeyDigest;

/// Interest matching API (Driving Port)
pub trait InterestMatchingApi: Send + Sync {
    /// Does a bare content name (no digest) satisfy `interest`?
    fn matches_name(
        &self,
        interest: &Interest,
        name: &Name,
        publisher: Option<&PublisherPublicKeyDigest>,
    ) -> bool;

    /// Does `content` satisfy `interest`?
    fn matches_content(&self, interest: &Interest, content: &ContentObject) -> bool;

    /// The Interests among `interests` that `content` satisfies, in input order
    fn satisfied_interests<'a>(
        &self,
        content: &ContentObject,
        interests: &'a [Interest],
    ) -> Vec<&'a Interest>;
}
