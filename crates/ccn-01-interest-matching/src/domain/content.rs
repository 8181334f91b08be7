//! Content objects
//!
//! The name a content object carries does not include its digest. The
//! digest is implicit and becomes the last component of [`ContentObject::full_name`].

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use super::name::Name;
use super::publisher::{Digest, PublisherPublicKeyDigest};

/// A named, optionally signed piece of content
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentObject {
    name: Name,
    publisher: Option<PublisherPublicKeyDigest>,
    payload: Vec<u8>,
}

impl ContentObject {
    pub fn new(name: Name, publisher: Option<PublisherPublicKeyDigest>, payload: Vec<u8>) -> Self {
        Self {
            name,
            publisher,
            payload,
        }
    }

    /// Unsigned content, used mostly by tests and local stores
    pub fn unsigned(name: Name, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(name, None, payload.into())
    }

    /// Name without the implicit digest component
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Digest of the signer's public key, if signed
    pub fn publisher(&self) -> Option<&PublisherPublicKeyDigest> {
        self.publisher.as_ref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// SHA-256 over the length-prefixed name components, publisher and payload
    pub fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        for component in self.name.components() {
            hasher.update((component.len() as u64).to_be_bytes());
            hasher.update(component);
        }
        match &self.publisher {
            Some(publisher) => {
                hasher.update([1u8]);
                hasher.update(publisher.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update(&self.payload);
        hasher.finalize().into()
    }

    /// Name with the digest appended as a final component
    pub fn full_name(&self) -> Name {
        self.name.append(self.digest().to_vec())
    }
}
