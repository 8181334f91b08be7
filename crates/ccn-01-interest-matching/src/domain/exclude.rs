//! Exclude filters
//!
//! An exclude filter is an ordered, duplicate-free sequence of excluded
//! components and range markers. A range marker excludes every component
//! strictly between its neighbouring components, or out to the end of the
//! component space when it sits at either end.
//!
//! INVARIANTS:
//! - Components are strictly increasing (no duplicates)
//! - Two range markers are never adjacent
//! - Lookups are O(log n) binary searches

use serde::{Deserialize, Serialize};

use super::name::{component_to_uri, Component};
use crate::error::ExcludeError;

/// One element of an exclude filter
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExcludeElement {
    /// A single excluded component
    Component(Component),
    /// Everything between the neighbouring components
    Any,
}

/// Set of components that must not appear at the position after an
/// Interest's prefix
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ExcludeElement>", into = "Vec<ExcludeElement>")]
pub struct ExcludeFilter {
    /// Excluded components, strictly increasing
    components: Vec<Component>,
    /// `ranges[i]` marks a range between `components[i - 1]` and
    /// `components[i]`; always `components.len() + 1` entries
    ranges: Vec<bool>,
}

impl ExcludeFilter {
    /// Build a filter from an ordered element sequence
    pub fn new(elements: Vec<ExcludeElement>) -> Result<Self, ExcludeError> {
        let mut components: Vec<Component> = Vec::with_capacity(elements.len());
        let mut ranges = vec![false];
        let mut last_was_range = false;

        for (index, element) in elements.into_iter().enumerate() {
            match element {
                ExcludeElement::Any => {
                    if last_was_range {
                        return Err(ExcludeError::AdjacentRanges { index });
                    }
                    let slot = components.len();
                    ranges[slot] = true;
                    last_was_range = true;
                }
                ExcludeElement::Component(component) => {
                    if let Some(previous) = components.last() {
                        if component == *previous {
                            return Err(ExcludeError::Duplicate { index });
                        }
                        if component < *previous {
                            return Err(ExcludeError::Unsorted { index });
                        }
                    }
                    components.push(component);
                    ranges.push(false);
                    last_was_range = false;
                }
            }
        }

        Ok(Self { components, ranges })
    }

    /// Build a filter excluding exactly these components, in any order
    pub fn from_components(mut components: Vec<Component>) -> Result<Self, ExcludeError> {
        components.sort();
        if let Some(index) = components.windows(2).position(|w| w[0] == w[1]) {
            return Err(ExcludeError::Duplicate { index: index + 1 });
        }
        let ranges = vec![false; components.len() + 1];
        Ok(Self { components, ranges })
    }

    /// Filter for a set of omissions; `None` when there is nothing to omit
    ///
    /// "No filter" and "empty filter" are different things on the wire, so
    /// an empty input yields no filter at all.
    pub fn factory(omissions: &[Component]) -> Result<Option<Self>, ExcludeError> {
        if omissions.is_empty() {
            return Ok(None);
        }
        Self::from_components(omissions.to_vec()).map(Some)
    }

    /// True if `component` is excluded by this filter
    pub fn exclude(&self, component: &[u8]) -> bool {
        match self
            .components
            .binary_search_by(|entry| entry.as_slice().cmp(component))
        {
            Ok(_) => true,
            Err(slot) => self.ranges[slot],
        }
    }

    /// The filter as an ordered element sequence
    pub fn elements(&self) -> Vec<ExcludeElement> {
        let mut out = Vec::with_capacity(self.len());
        for (slot, &range) in self.ranges.iter().enumerate() {
            if range {
                out.push(ExcludeElement::Any);
            }
            if let Some(component) = self.components.get(slot) {
                out.push(ExcludeElement::Component(component.clone()));
            }
        }
        out
    }

    /// Excluded single components, in order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of elements, range markers included
    pub fn len(&self) -> usize {
        self.components.len() + self.ranges.iter().filter(|&&r| r).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compact rendering used by `Interest`'s display form
    pub fn summary(&self) -> String {
        self.elements()
            .iter()
            .map(|e| match e {
                ExcludeElement::Component(c) => component_to_uri(c),
                ExcludeElement::Any => "*".to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<Vec<ExcludeElement>> for ExcludeFilter {
    type Error = ExcludeError;

    fn try_from(elements: Vec<ExcludeElement>) -> Result<Self, Self::Error> {
        ExcludeFilter::new(elements)
    }
}

impl From<ExcludeFilter> for Vec<ExcludeElement> {
    fn from(filter: ExcludeFilter) -> Self {
        filter.elements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(s: &str) -> ExcludeElement {
        ExcludeElement::Component(s.as_bytes().to_vec())
    }

    #[test]
    fn test_factory_returns_none_for_empty_input() {
        assert_eq!(ExcludeFilter::factory(&[]).unwrap(), None);
        let filter = ExcludeFilter::factory(&[b"x".to_vec()]).unwrap().unwrap();
        assert!(filter.exclude(b"x"));
    }

    #[test]
    fn test_components_only_filter() {
        let filter = ExcludeFilter::from_components(vec![b"b".to_vec(), b"a".to_vec()]).unwrap();
        assert!(filter.exclude(b"a"));
        assert!(filter.exclude(b"b"));
        assert!(!filter.exclude(b"c"));
        assert!(!filter.exclude(b""));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_range_markers_cover_gaps_and_ends() {
        let filter = ExcludeFilter::new(vec![ExcludeElement::Any, c("d"), c("m"), ExcludeElement::Any, c("t")])
            .unwrap();
        assert!(filter.exclude(b"a"), "leading range");
        assert!(filter.exclude(b"d"));
        assert!(!filter.exclude(b"g"), "no range between d and m");
        assert!(filter.exclude(b"p"), "range between m and t");
        assert!(filter.exclude(b"t"));
        assert!(!filter.exclude(b"z"), "no trailing range");
        assert_eq!(filter.len(), 5);
        assert_eq!(filter.summary(), "*,d,m,*,t");
    }

    #[test]
    fn test_trailing_range() {
        let filter = ExcludeFilter::new(vec![c("k"), ExcludeElement::Any]).unwrap();
        assert!(!filter.exclude(b"a"));
        assert!(filter.exclude(b"k"));
        assert!(filter.exclude(b"zzz"));
    }

    #[test]
    fn test_illegal_constructor_input() {
        assert_eq!(
            ExcludeFilter::new(vec![c("b"), c("a")]),
            Err(ExcludeError::Unsorted { index: 1 })
        );
        assert_eq!(
            ExcludeFilter::new(vec![c("a"), c("a")]),
            Err(ExcludeError::Duplicate { index: 1 })
        );
        assert_eq!(
            ExcludeFilter::new(vec![c("a"), ExcludeElement::Any, ExcludeElement::Any]),
            Err(ExcludeError::AdjacentRanges { index: 2 })
        );
        assert!(matches!(
            ExcludeFilter::from_components(vec![b"q".to_vec(), b"q".to_vec()]),
            Err(ExcludeError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_elements_round_trip() {
        let elements = vec![ExcludeElement::Any, c("b"), c("c"), ExcludeElement::Any];
        let filter = ExcludeFilter::new(elements.clone()).unwrap();
        assert_eq!(filter.elements(), elements);
    }

    #[test]
    fn test_serde_rejects_invalid_filters() {
        let filter = ExcludeFilter::new(vec![c("a"), ExcludeElement::Any]).unwrap();
        let json = serde_json::to_string(&filter).unwrap();
        let back: ExcludeFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);

        let bad = r#"[{"Component":[2]},{"Component":[1]}]"#;
        assert!(serde_json::from_str::<ExcludeFilter>(bad).is_err());
    }

    proptest! {
        #[test]
        fn prop_membership_is_exact(
            set in proptest::collection::btree_set(proptest::collection::vec(any::<u8>(), 0..4), 0..16),
            candidate in proptest::collection::vec(any::<u8>(), 0..4),
        ) {
            let filter = ExcludeFilter::from_components(set.iter().cloned().collect()).unwrap();
            for member in &set {
                prop_assert!(filter.exclude(member));
            }
            prop_assert_eq!(filter.exclude(&candidate), set.contains(&candidate));
        }

        #[test]
        fn prop_equality_ignores_input_order(
            set in proptest::collection::btree_set(proptest::collection::vec(any::<u8>(), 0..4), 1..12),
        ) {
            let forward: Vec<Component> = set.iter().cloned().collect();
            let mut reversed = forward.clone();
            reversed.reverse();
            prop_assert_eq!(
                ExcludeFilter::from_components(forward).unwrap(),
                ExcludeFilter::from_components(reversed).unwrap()
            );
        }
    }
}
