//! Interest Matcher Service
//!
//! Binds the matching predicate to an injected trust manager.

use std::sync::Arc;

use crate::adapters::exact_key::ExactKeyTrustManager;
use crate::domain::{ContentObject, Interest, Name, PublisherPublicKeyDigest};
use crate::ports::{InterestMatchingApi, TrustManager};

/// Interest matcher implementation
///
/// Implements the `InterestMatchingApi` port using the injected trust manager.
pub struct InterestMatcher<T: TrustManager> {
    /// Trust manager (driven port)
    trust: Arc<T>,
}

impl<T: TrustManager> InterestMatcher<T> {
    pub fn new(trust: Arc<T>) -> Self {
        Self { trust }
    }

    pub fn trust_manager(&self) -> &Arc<T> {
        &self.trust
    }
}

impl Default for InterestMatcher<ExactKeyTrustManager> {
    fn default() -> Self {
        Self::new(Arc::new(ExactKeyTrustManager))
    }
}

impl<T: TrustManager> Clone for InterestMatcher<T> {
    fn clone(&self) -> Self {
        Self {
            trust: Arc::clone(&self.trust),
        }
    }
}

impl<T: TrustManager> InterestMatchingApi for InterestMatcher<T> {
    fn matches_name(
        &self,
        interest: &Interest,
        name: &Name,
        publisher: Option<&PublisherPublicKeyDigest>,
    ) -> bool {
        interest.matches_name_with(name, publisher, self.trust.as_ref())
    }

    fn matches_content(&self, interest: &Interest, content: &ContentObject) -> bool {
        interest.matches_content_with(content, self.trust.as_ref())
    }

    fn satisfied_interests<'a>(
        &self,
        content: &ContentObject,
        interests: &'a [Interest],
    ) -> Vec<&'a Interest> {
        interests
            .iter()
            .filter(|interest| self.matches_content(interest, content))
            .collect()
    }
}
