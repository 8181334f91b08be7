//! Hierarchical content names
//!
//! A [`Name`] is an immutable ordered sequence of opaque byte components.
//!
//! ORDERING: component-wise lexicographic by byte value; when one name is a
//! component prefix of the other, the shorter name sorts first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Optional URI scheme accepted by [`Name::from_uri`]
pub const URI_SCHEME: &str = "ccnx:";

/// A single name component
pub type Component = Vec<u8>;

/// Ordered sequence of binary components identifying content or a namespace
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// Create a name from its components
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// The root name `/`, a prefix of every name
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from UTF-8 segments, one component per segment
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            components: segments.into_iter().map(|s| s.as_ref().to_vec()).collect(),
        }
    }

    /// Parse a name from its URI form, e.g. `/parc/videos/%C1%2Efile`
    ///
    /// The `ccnx:` scheme is optional. Components are percent-decoded. A
    /// component made only of dots must carry at least three; the first
    /// three are stripped so `...` is the empty component.
    pub fn from_uri(uri: &str) -> Result<Self, NameError> {
        let path = uri.strip_prefix(URI_SCHEME).unwrap_or(uri);
        if !path.starts_with('/') {
            return Err(NameError::MissingLeadingSlash(uri.to_string()));
        }

        let mut components = Vec::new();
        let mut offset = 1;
        for segment in path[1..].split('/') {
            let segment_start = offset;
            offset += segment.len() + 1;
            if segment.is_empty() {
                continue;
            }
            let decoded = percent_decode(segment).map_err(|pos| NameError::InvalidEscape {
                uri: uri.to_string(),
                position: segment_start + pos,
            })?;
            if decoded.iter().all(|&b| b == b'.') {
                if decoded.len() < 3 {
                    return Err(NameError::RelativeComponent {
                        uri: uri.to_string(),
                        component: segment.to_string(),
                    });
                }
                components.push(decoded[3..].to_vec());
            } else {
                components.push(decoded);
            }
        }
        Ok(Self { components })
    }

    /// Number of components
    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// True for the root name
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Component at `index`, if present
    pub fn component(&self, index: usize) -> Option<&[u8]> {
        self.components.get(index).map(Vec::as_slice)
    }

    /// All components in order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Last component, if any
    pub fn last_component(&self) -> Option<&[u8]> {
        self.components.last().map(Vec::as_slice)
    }

    /// New name with `component` appended
    pub fn append(&self, component: impl Into<Component>) -> Name {
        let mut components = self.components.clone();
        components.push(component.into());
        Name { components }
    }

    /// New name made of the first `count` components (clamped to length)
    pub fn prefix(&self, count: usize) -> Name {
        let end = count.min(self.components.len());
        Name {
            components: self.components[..end].to_vec(),
        }
    }

    /// True iff the first `count` components of `candidate` equal the first
    /// `count` components of this name
    ///
    /// Fails when `count` exceeds either name's component count.
    pub fn is_prefix_of(&self, candidate: &Name, count: usize) -> bool {
        if count > self.count() || count > candidate.count() {
            return false;
        }
        self.components[..count] == candidate.components[..count]
    }

    /// Prefix test over this name's full length
    pub fn is_prefix_of_name(&self, candidate: &Name) -> bool {
        self.is_prefix_of(candidate, self.count())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            f.write_str("/")?;
            f.write_str(&component_to_uri(component))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::from_uri(s)
    }
}

/// Render one component in URI form
pub fn component_to_uri(component: &[u8]) -> String {
    let mut out = String::with_capacity(component.len() + 3);
    if component.iter().all(|&b| b == b'.') {
        out.push_str("...");
    }
    for &b in component {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Decode `%XX` escapes; the error is the byte offset of the bad escape
fn percent_decode(segment: &str) -> Result<Vec<u8>, usize> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or(i)?;
            let hi = (hex[0] as char).to_digit(16).ok_or(i)?;
            let lo = (hex[1] as char).to_digit(16).ok_or(i)?;
            out.push((hi * 16 + lo) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
