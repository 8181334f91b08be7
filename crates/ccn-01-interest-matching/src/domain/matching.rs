//! The Interest matching predicate
//!
//! Decides whether a candidate name or content object satisfies an
//! Interest. Checks run in a fixed order and stop at the first failure:
//!
//! 1. Prefix test against the effective prefix length
//! 2. Additional name component count
//! 3. Order preference (candidate must sort after the Interest name)
//! 4. Exclude filter at the position after the prefix
//! 5. Publisher requirement, delegated to a [`TrustManager`]
//!
//! When matching a content object the digest component is inferred from
//! component arithmetic: if the content name is exactly one short of the
//! Interest's prefix length, the full name (digest appended) is tested.
//! A name that happens to have that length for another reason is treated
//! the same way.

use tracing::trace;

use super::content::ContentObject;
use super::interest::Interest;
use super::name::Name;
use super::publisher::PublisherPublicKeyDigest;
use crate::ports::outbound::TrustManager;

impl Interest {
    /// Prefix length used when the caller gave none
    fn our_count(&self) -> usize {
        self.name_component_count.unwrap_or_else(|| self.name.count())
    }

    /// Prefix test against a name that carries no explicit digest
    ///
    /// An Interest with `additional_name_components == 0` names a complete
    /// content name with its digest, so the digest is dropped from the
    /// comparison.
    pub fn is_prefix_of(&self, candidate: &Name) -> bool {
        let mut count = self.our_count();
        if self.additional_name_components == Some(0)
            && self
                .name_component_count
                .map_or(true, |ncc| ncc == self.name.count())
        {
            count = count.saturating_sub(1);
        }
        self.name.is_prefix_of(candidate, count)
    }

    /// Prefix test against a content object's name
    pub fn is_prefix_of_content(&self, content: &ContentObject) -> bool {
        self.name.is_prefix_of(content.name(), self.our_count())
    }

    /// Match a bare content name (no digest component)
    pub fn matches_name_with(
        &self,
        candidate: &Name,
        publisher: Option<&PublisherPublicKeyDigest>,
        trust: &dyn TrustManager,
    ) -> bool {
        if !self.is_prefix_of(candidate) {
            trace!(interest = %self, candidate = %candidate, "Interest match failed: not a prefix");
            return false;
        }
        self.internal_match(candidate, false, publisher, trust)
    }

    /// Match a content object, using its own publisher digest
    pub fn matches_content_with(&self, content: &ContentObject, trust: &dyn TrustManager) -> bool {
        let digest_included = content.name().count() + 1 == self.our_count();
        let full_name;
        let candidate = if digest_included {
            full_name = content.full_name();
            &full_name
        } else {
            content.name()
        };

        if !self.is_prefix_of(candidate) {
            trace!(interest = %self, candidate = %candidate, "Interest match failed: not a prefix");
            return false;
        }
        self.internal_match(candidate, digest_included, content.publisher(), trust)
    }

    fn internal_match(
        &self,
        candidate: &Name,
        digest_included: bool,
        publisher: Option<&PublisherPublicKeyDigest>,
        trust: &dyn TrustManager,
    ) -> bool {
        if let Some(additional) = self.additional_name_components {
            let length_diff = candidate.count() as i64 + if digest_included { 0 } else { 1 }
                - self.our_count() as i64;
            if length_diff != additional as i64 {
                trace!(
                    interest = %self,
                    candidate = %candidate,
                    length_diff,
                    additional,
                    "Interest match failed: wrong number of additional components"
                );
                return false;
            }
        }

        if self.order_preference.is_some() && *candidate <= self.name {
            // One component short with the digest counted means we matched by digest
            let matched_by_digest =
                digest_included && candidate.count() + 1 == self.name.count();
            if !matched_by_digest {
                trace!(
                    interest = %self,
                    candidate = %candidate,
                    "Interest match failed: candidate does not sort after the Interest name"
                );
                return false;
            }
        }

        if let Some(filter) = &self.exclude_filter {
            let index = self.our_count();
            if let Some(component) = candidate.component(index) {
                if filter.exclude(component) {
                    trace!(
                        interest = %self,
                        candidate = %candidate,
                        index,
                        "Interest match failed: component after prefix is excluded"
                    );
                    return false;
                }
            }
        }

        if let Some(required) = &self.publisher_id {
            let Some(publisher) = publisher else {
                trace!(
                    interest = %self,
                    candidate = %candidate,
                    "Interest match failed: candidate has no publisher"
                );
                return false;
            };
            return trust.matches_role(required, publisher);
        }

        true
    }
}
