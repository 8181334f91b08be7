//! Version numbers
//!
//! A version is a timestamp in CCN binary time: 1/4096 second ticks since
//! the Unix epoch, limited to 48 bits. As a name component it is the marker
//! byte `0xFD` followed by the ticks as six big-endian bytes, so byte order
//! of components equals numeric order of versions.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ccn_01_interest_matching::{Component, Name};
use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// First byte of every version component
pub const VERSION_MARKER: u8 = 0xFD;

/// Marker plus six tick bytes
pub const VERSION_COMPONENT_LEN: usize = 7;

/// Ticks per second of CCN binary time
pub const TICKS_PER_SECOND: u64 = 4096;

const MAX_TICKS: u64 = (1 << 48) - 1;

/// Totally ordered, time-derived version
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionNumber(u64);

impl VersionNumber {
    pub const MIN: VersionNumber = VersionNumber(0);
    pub const MAX: VersionNumber = VersionNumber(MAX_TICKS);

    pub fn from_ticks(ticks: u64) -> Result<Self, VersionError> {
        if ticks > MAX_TICKS {
            return Err(VersionError::OutOfRange { ticks });
        }
        Ok(Self(ticks))
    }

    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Version for the current wall-clock time
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self::from_duration(since_epoch)
    }

    /// Version for a time in milliseconds since the epoch, clamped to MAX
    pub fn from_millis(millis: u64) -> Self {
        let ticks = u128::from(millis) * u128::from(TICKS_PER_SECOND) / 1000;
        Self(u64::try_from(ticks).unwrap_or(MAX_TICKS).min(MAX_TICKS))
    }

    pub fn from_duration(since_epoch: Duration) -> Self {
        let ticks = since_epoch.as_nanos() * u128::from(TICKS_PER_SECOND) / 1_000_000_000;
        Self(u64::try_from(ticks).unwrap_or(MAX_TICKS).min(MAX_TICKS))
    }

    /// Milliseconds since the epoch, rounded down
    pub fn as_millis(self) -> u64 {
        self.0 * 1000 / TICKS_PER_SECOND
    }

    pub fn next(self) -> Option<Self> {
        (self.0 < MAX_TICKS).then(|| Self(self.0 + 1))
    }

    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Fixed-width name component for this version
    pub fn to_component(self) -> Component {
        let mut component = Vec::with_capacity(VERSION_COMPONENT_LEN);
        component.push(VERSION_MARKER);
        component.extend_from_slice(&self.0.to_be_bytes()[2..]);
        component
    }

    /// Parse a version component; only the exact fixed-width form is accepted
    pub fn from_component(component: &[u8]) -> Result<Self, VersionError> {
        match component {
            [VERSION_MARKER, ticks @ ..] if ticks.len() == VERSION_COMPONENT_LEN - 1 => {
                let value = ticks.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
                Ok(Self(value))
            }
            _ => Err(VersionError::NotAVersion {
                marker: component.first().copied(),
                len: component.len(),
            }),
        }
    }

    /// Version found at `index` in `name`
    pub fn from_name_at(name: &Name, index: usize) -> Result<Self, VersionError> {
        let component = name
            .component(index)
            .ok_or(VersionError::MissingComponent { index })?;
        Self::from_component(component)
    }

    pub fn is_version_component(component: &[u8]) -> bool {
        Self::from_component(component).is_ok()
    }

    /// `name` with this version appended
    pub fn append_to(self, name: &Name) -> Name {
        name.append(self.to_component())
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_component_layout() {
        let version = VersionNumber::from_ticks(0x0102_0304_0506).unwrap();
        assert_eq!(
            version.to_component(),
            vec![VERSION_MARKER, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]
        );
        assert_eq!(VersionNumber::MAX.to_component(), vec![VERSION_MARKER, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_rejects_non_version_components() {
        assert!(VersionNumber::from_component(b"").is_err());
        assert!(VersionNumber::from_component(b"v1").is_err());
        assert!(VersionNumber::from_component(&[VERSION_MARKER, 1, 2]).is_err());
        assert!(VersionNumber::from_component(&[0xFC, 0, 0, 0, 0, 0, 1]).is_err());
        assert_eq!(
            VersionNumber::from_ticks(MAX_TICKS + 1),
            Err(VersionError::OutOfRange { ticks: MAX_TICKS + 1 })
        );
    }

    #[test]
    fn test_from_name_at() {
        let base = Name::from_uri("/a/b").unwrap();
        let version = VersionNumber::from_ticks(77).unwrap();
        let name = version.append_to(&base).append(b"seg0".to_vec());
        assert_eq!(VersionNumber::from_name_at(&name, 2), Ok(version));
        assert!(VersionNumber::from_name_at(&name, 3).is_err());
        assert_eq!(
            VersionNumber::from_name_at(&name, 9),
            Err(VersionError::MissingComponent { index: 9 })
        );
    }

    #[test]
    fn test_millis_conversion() {
        let version = VersionNumber::from_millis(1_000);
        assert_eq!(version.ticks(), TICKS_PER_SECOND);
        assert_eq!(version.as_millis(), 1_000);
        assert_eq!(VersionNumber::from_millis(u64::MAX), VersionNumber::MAX);
    }

    #[test]
    fn test_now_is_recent() {
        let before = VersionNumber::from_millis(1_600_000_000_000);
        assert!(VersionNumber::now() > before);
    }

    #[test]
    fn test_next_and_prev_saturate() {
        assert_eq!(VersionNumber::MIN.prev(), None);
        assert_eq!(VersionNumber::MAX.next(), None);
        assert_eq!(
            VersionNumber::MIN.next().and_then(VersionNumber::prev),
            Some(VersionNumber::MIN)
        );
    }

    proptest! {
        #[test]
        fn prop_component_round_trips(ticks in 0..=MAX_TICKS) {
            let version = VersionNumber::from_ticks(ticks).unwrap();
            prop_assert_eq!(VersionNumber::from_component(&version.to_component()), Ok(version));
        }

        #[test]
        fn prop_byte_order_matches_numeric_order(a in 0..=MAX_TICKS, b in 0..=MAX_TICKS) {
            let va = VersionNumber::from_ticks(a).unwrap();
            let vb = VersionNumber::from_ticks(b).unwrap();
            prop_assert_eq!(va.to_component().cmp(&vb.to_component()), va.cmp(&vb));
        }

        #[test]
        fn prop_millis_within_one_millisecond(millis in 0u64..1u64 << 40) {
            let back = VersionNumber::from_millis(millis).as_millis();
            prop_assert!(back <= millis && millis - back <= 1);
        }
    }
}
