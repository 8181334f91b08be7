//! Trust by exact key digest
//!
//! Only `PublisherKind::Key` requirements can be checked without a
//! certificate store; other kinds never match.

use tracing::debug;

use crate::domain::publisher::{PublisherId, PublisherKind, PublisherPublicKeyDigest};
use crate::ports::outbound::TrustManager;

/// Trust manager that accepts a publisher only if its key digest equals the
/// required one
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactKeyTrustManager;

impl TrustManager for ExactKeyTrustManager {
    fn matches_role(&self, required: &PublisherId, candidate: &PublisherPublicKeyDigest) -> bool {
        match required.kind {
            PublisherKind::Key => required.id == candidate.0,
            kind => {
                debug!(
                    ?kind,
                    candidate = %candidate,
                    "[ExactKeyTrustManager] Cannot verify non-key publisher requirement"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_match() {
        let digest = PublisherPublicKeyDigest([4; 32]);
        let trust = ExactKeyTrustManager;
        assert!(trust.matches_role(&PublisherId::exact(&digest), &digest));
        assert!(!trust.matches_role(&PublisherId::exact(&digest), &PublisherPublicKeyDigest([5; 32])));
    }

    #[test]
    fn test_issuer_kinds_are_rejected() {
        let digest = PublisherPublicKeyDigest([4; 32]);
        let trust = ExactKeyTrustManager;
        for kind in [
            PublisherKind::Certificate,
            PublisherKind::IssuerKey,
            PublisherKind::IssuerCertificate,
        ] {
            assert!(!trust.matches_role(&PublisherId::new(kind, digest.0), &digest));
        }
    }
}
