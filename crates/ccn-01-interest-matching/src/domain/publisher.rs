//! Publisher identities
//!
//! Content carries the digest of its signer's public key. An Interest may
//! require a publisher by [`PublisherId`]; whether a digest satisfies that
//! requirement is decided by a `TrustManager`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a publisher key digest (SHA-256)
pub const PUBLISHER_ID_LEN: usize = 32;

/// 32-byte digest type
pub type Digest = [u8; PUBLISHER_ID_LEN];

/// SHA-256 digest of the publisher's public key
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublisherPublicKeyDigest(pub Digest);

impl PublisherPublicKeyDigest {
    pub fn new(digest: Digest) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }
}

impl fmt::Display for PublisherPublicKeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// What a [`PublisherId`] digest refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PublisherKind {
    /// Digest of the publisher's own key
    Key,
    /// Digest of the publisher's certificate
    Certificate,
    /// Digest of the key that issued the publisher's certificate
    IssuerKey,
    /// Digest of the issuer's certificate
    IssuerCertificate,
}

/// Publisher requirement carried by an Interest
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublisherId {
    pub kind: PublisherKind,
    pub id: Digest,
}

impl PublisherId {
    pub fn new(kind: PublisherKind, id: Digest) -> Self {
        Self { kind, id }
    }

    /// Require exactly the publisher holding the key with this digest
    pub fn exact(digest: &PublisherPublicKeyDigest) -> Self {
        Self {
            kind: PublisherKind::Key,
            id: digest.0,
        }
    }
}

impl From<PublisherPublicKeyDigest> for PublisherId {
    fn from(digest: PublisherPublicKeyDigest) -> Self {
        PublisherId::exact(&digest)
    }
}
