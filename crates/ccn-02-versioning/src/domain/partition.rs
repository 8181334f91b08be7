//! Exclusion partitions
//!
//! The version space `[MIN, MAX]` is cut into contiguous partitions. Each
//! partition owns the excluded versions inside its bounds and is expressed
//! as one Interest whose exclude filter:
//!
//! - excludes everything below `lower` with a leading range
//! - excludes each already-seen version
//! - excludes everything above `upper` with a trailing range
//!
//! At the ends of the version space the ranges stop at sentinel components
//! just outside it, so components that are not versions are excluded too.
//!
//! Components under the base name that are not versions but still pass the
//! filter, such as a short `0xFD` component, are recorded as strays and
//! excluded the same way, so the same content cannot answer twice.
//!
//! A partition holding more than the configured number of exclusions is
//! split at its median, so no exclusion is ever dropped.

use std::collections::BTreeSet;

use ccn_01_interest_matching::{Component, ExcludeElement, ExcludeError, ExcludeFilter, Interest, Name};

use super::config::VersioningConfig;
use super::version::{VersionNumber, VERSION_MARKER};

/// Sorts before every version component
fn below_all_versions() -> Vec<u8> {
    vec![VERSION_MARKER]
}

/// Sorts after every version component and before anything longer than it
fn above_all_versions() -> Vec<u8> {
    let mut component = VersionNumber::MAX.to_component();
    component.push(0);
    component
}

/// A contiguous, inclusive range of versions and the versions excluded in it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionPartition {
    lower: VersionNumber,
    upper: VersionNumber,
    excluded: BTreeSet<VersionNumber>,
    /// Non-version components seen inside the bounds
    strays: BTreeSet<Component>,
}

impl ExclusionPartition {
    /// Partition covering `[lower, upper]` with nothing excluded
    pub fn new(lower: VersionNumber, upper: VersionNumber) -> Self {
        Self {
            lower,
            upper,
            excluded: BTreeSet::new(),
            strays: BTreeSet::new(),
        }
    }

    /// Partition covering every version
    pub fn full() -> Self {
        Self::new(VersionNumber::MIN, VersionNumber::MAX)
    }

    /// Cover the version space with partitions holding `exclusions`
    ///
    /// Each partition starts half full so it can absorb new versions before
    /// splitting.
    pub fn cover(exclusions: &BTreeSet<VersionNumber>, max_excludes: usize) -> Vec<Self> {
        let chunk = (max_excludes / 2).max(1);
        let versions: Vec<VersionNumber> = exclusions.iter().copied().collect();
        let chunks: Vec<&[VersionNumber]> = versions.chunks(chunk).collect();
        if chunks.is_empty() {
            return vec![Self::full()];
        }

        let mut partitions = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let lower = if i == 0 { VersionNumber::MIN } else { chunk[0] };
            let upper = chunks
                .get(i + 1)
                .and_then(|next| next[0].prev())
                .unwrap_or(VersionNumber::MAX);
            partitions.push(Self {
                lower,
                upper,
                excluded: chunk.iter().copied().collect(),
                strays: BTreeSet::new(),
            });
        }
        partitions
    }

    pub fn lower(&self) -> VersionNumber {
        self.lower
    }

    pub fn upper(&self) -> VersionNumber {
        self.upper
    }

    pub fn covers(&self, version: VersionNumber) -> bool {
        self.lower <= version && version <= self.upper
    }

    pub fn is_excluded(&self, version: VersionNumber) -> bool {
        self.excluded.contains(&version)
    }

    /// Exclude `version`; false if it was already excluded
    pub fn insert(&mut self, version: VersionNumber) -> bool {
        self.excluded.insert(version)
    }

    /// Exclude a non-version component; false if it was already excluded
    pub fn insert_stray(&mut self, component: Component) -> bool {
        self.strays.insert(component)
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    pub fn stray_count(&self) -> usize {
        self.strays.len()
    }

    pub fn excluded(&self) -> impl Iterator<Item = VersionNumber> + '_ {
        self.excluded.iter().copied()
    }

    pub fn needs_split(&self, max_excludes: usize) -> bool {
        self.excluded.len() + self.strays.len() > max_excludes
    }

    /// Split at the median exclusion into `[lower, pivot - 1]` and `[pivot, upper]`
    ///
    /// Returns the partition unchanged when it holds fewer than two exclusions.
    /// A stray sorting between the two boundary versions passes both halves'
    /// filters, so it is kept in both.
    pub fn split(self) -> (Self, Option<Self>) {
        let Some(pivot) = self.excluded.iter().nth(self.excluded.len() / 2).copied() else {
            return (self, None);
        };
        let Some(left_upper) = pivot.prev().filter(|v| *v >= self.lower) else {
            return (self, None);
        };

        let left_above = pivot.to_component();
        let right_below = left_upper.to_component();
        let left_strays = self.strays.iter().filter(|s| **s < left_above).cloned().collect();
        let right_strays = self.strays.into_iter().filter(|s| *s > right_below).collect();

        let mut left_excluded = self.excluded;
        let right_excluded = left_excluded.split_off(&pivot);
        let left = Self {
            lower: self.lower,
            upper: left_upper,
            excluded: left_excluded,
            strays: left_strays,
        };
        let right = Self {
            lower: pivot,
            upper: self.upper,
            excluded: right_excluded,
            strays: right_strays,
        };
        (left, Some(right))
    }

    /// Exclude filter admitting only unseen versions inside the bounds
    pub fn exclude_filter(&self) -> Result<ExcludeFilter, ExcludeError> {
        let below = self
            .lower
            .prev()
            .map_or_else(below_all_versions, VersionNumber::to_component);
        let above = self
            .upper
            .next()
            .map_or_else(above_all_versions, VersionNumber::to_component);

        let mut inner: Vec<Component> = self
            .excluded
            .iter()
            .map(|v| v.to_component())
            .chain(self.strays.iter().cloned())
            .collect();
        inner.sort();

        let mut elements = Vec::with_capacity(inner.len() + 4);
        elements.push(ExcludeElement::Any);
        elements.push(ExcludeElement::Component(below));
        elements.extend(inner.into_iter().map(ExcludeElement::Component));
        elements.push(ExcludeElement::Component(above));
        elements.push(ExcludeElement::Any);
        ExcludeFilter::new(elements)
    }

    /// Interest retrieving any version in this partition not yet excluded
    pub fn interest(&self, basename: &Name, config: &VersioningConfig) -> Result<Interest, ExcludeError> {
        let mut interest = Interest::new(basename.clone());
        interest.additional_name_components = config.additional_name_components;
        interest.exclude_filter = Some(self.exclude_filter()?);
        Ok(interest)
    }
}
