//! Interests
//!
//! An [`Interest`] is a name plus optional constraints describing which
//! content satisfies it. Every optional constraint is an explicit `Option`,
//! so "absent" and "zero" are distinct.
//!
//! Equality compares every field. The derived ordering is field by field,
//! name first; it exists for deduplication in ordered sets and carries no
//! protocol meaning.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::content::ContentObject;
use super::exclude::ExcludeFilter;
use super::name::{Component, Name};
use super::publisher::PublisherId;
use crate::error::{CodecError, ExcludeError, NameError};

/// Order preference bitmask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderPreference(pub u32);

impl OrderPreference {
    /// Leftmost answer (bit 0 clear)
    pub const LEFT: OrderPreference = OrderPreference(0);
    /// Rightmost answer
    pub const RIGHT: OrderPreference = OrderPreference(1);
    /// Order by arrival
    pub const ORDER_ARRIVAL: OrderPreference = OrderPreference(2);
    /// Order by name hierarchy
    pub const ORDER_NAME: OrderPreference = OrderPreference(4);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set
    pub fn contains(self, other: OrderPreference) -> bool {
        self.0 & other.0 == other.0
    }

    /// Rightmost answers requested
    pub fn prefers_right(self) -> bool {
        self.contains(Self::RIGHT)
    }
}

impl BitOr for OrderPreference {
    type Output = OrderPreference;

    fn bitor(self, rhs: Self) -> Self::Output {
        OrderPreference(self.0 | rhs.0)
    }
}

/// Answer origin kind bitmask
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnswerOriginKind(pub u32);

impl AnswerOriginKind {
    pub const CONTENT_STORE: AnswerOriginKind = AnswerOriginKind(1);
    pub const GENERATED: AnswerOriginKind = AnswerOriginKind(2);
    /// Stale answers are acceptable
    pub const STALE: AnswerOriginKind = AnswerOriginKind(4);
    /// Mark matching content stale; requires scope 0
    pub const MARK_STALE: AnswerOriginKind = AnswerOriginKind(16);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: AnswerOriginKind) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for AnswerOriginKind {
    fn default() -> Self {
        AnswerOriginKind(Self::CONTENT_STORE.0 | Self::GENERATED.0)
    }
}

impl BitOr for AnswerOriginKind {
    type Output = AnswerOriginKind;

    fn bitor(self, rhs: Self) -> Self::Output {
        AnswerOriginKind(self.0 | rhs.0)
    }
}

/// A declarative request for content
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interest {
    /// Name prefix of the requested content.
    pub name: Name,
    /// Prefix length used for matching, decoupled from suffix bounds.
    pub name_component_count: Option<usize>,
    /// Exact number of components beyond the prefix.
    pub additional_name_components: Option<usize>,
    /// Required publisher.
    pub publisher_id: Option<PublisherId>,
    /// Components excluded at the position after the prefix.
    pub exclude_filter: Option<ExcludeFilter>,
    pub order_preference: Option<OrderPreference>,
    pub answer_origin_kind: Option<AnswerOriginKind>,
    pub scope: Option<u32>,
    pub count: Option<u32>,
    pub nonce: Option<Vec<u8>>,
    pub response_filter: Option<Vec<u8>>,
}

impl Interest {
    /// Interest for everything under `name`
    pub fn new(name: Name) -> Self {
        Self {
            name,
            name_component_count: None,
            additional_name_components: None,
            publisher_id: None,
            exclude_filter: None,
            order_preference: None,
            answer_origin_kind: None,
            scope: None,
            count: None,
            nonce: None,
            response_filter: None,
        }
    }

    /// Parse the name from URI form
    pub fn from_uri(uri: &str) -> Result<Self, NameError> {
        Ok(Self::new(Name::from_uri(uri)?))
    }

    pub fn with_publisher(name: Name, publisher: Option<PublisherId>) -> Self {
        Self {
            publisher_id: publisher,
            ..Self::new(name)
        }
    }

    pub fn with_additional_components(
        name: Name,
        additional_name_components: usize,
        publisher: Option<PublisherId>,
    ) -> Self {
        Self {
            additional_name_components: Some(additional_name_components),
            ..Self::with_publisher(name, publisher)
        }
    }

    // -------------------------------------------------------------------------
    // Builder methods
    // -------------------------------------------------------------------------

    pub fn name_component_count(mut self, count: usize) -> Self {
        self.name_component_count = Some(count);
        self
    }

    pub fn additional_name_components(mut self, count: usize) -> Self {
        self.additional_name_components = Some(count);
        self
    }

    pub fn publisher_id(mut self, publisher: PublisherId) -> Self {
        self.publisher_id = Some(publisher);
        self
    }

    pub fn exclude_filter(mut self, filter: ExcludeFilter) -> Self {
        self.exclude_filter = Some(filter);
        self
    }

    pub fn order_preference(mut self, order: OrderPreference) -> Self {
        self.order_preference = Some(order);
        self
    }

    pub fn answer_origin_kind(mut self, kind: AnswerOriginKind) -> Self {
        self.answer_origin_kind = Some(kind);
        self
    }

    pub fn scope(mut self, scope: u32) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn nonce(mut self, nonce: Vec<u8>) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn response_filter(mut self, filter: Vec<u8>) -> Self {
        self.response_filter = Some(filter);
        self
    }

    // -------------------------------------------------------------------------
    // Factories
    // -------------------------------------------------------------------------

    /// Interest for the content following `name` in name order
    ///
    /// The prefix count defaults to one less than the name's length.
    pub fn next(name: Name) -> Self {
        Self::next_or_last(name, None, OrderPreference::LEFT | OrderPreference::ORDER_NAME, None)
    }

    pub fn next_with_prefix(name: Name, prefix_count: usize) -> Self {
        Self::next_or_last(
            name,
            None,
            OrderPreference::LEFT | OrderPreference::ORDER_NAME,
            Some(prefix_count),
        )
    }

    /// As [`Interest::next`], additionally excluding explicit omissions
    pub fn next_excluding(
        name: Name,
        omissions: &[Component],
        prefix_count: Option<usize>,
    ) -> Result<Self, ExcludeError> {
        let filter = ExcludeFilter::factory(omissions)?;
        Ok(Self::next_or_last(
            name,
            filter,
            OrderPreference::LEFT | OrderPreference::ORDER_NAME,
            prefix_count,
        ))
    }

    /// Interest for the content following `content`, digest included
    pub fn next_after_content(content: &ContentObject, prefix_count: Option<usize>) -> Self {
        let full_name = content.full_name();
        let prefix = prefix_count.unwrap_or_else(|| full_name.count().saturating_sub(2));
        Self::next_with_prefix(full_name, prefix)
    }

    /// Interest for the last (rightmost) content under `name`
    pub fn last(name: Name) -> Self {
        Self::next_or_last(name, None, OrderPreference::RIGHT | OrderPreference::ORDER_NAME, None)
    }

    /// Rightmost content under the first `prefix_count` components of `name`
    pub fn last_with_prefix(name: &Name, prefix_count: usize) -> Self {
        Self::next_or_last(
            name.prefix(prefix_count),
            None,
            OrderPreference::RIGHT | OrderPreference::ORDER_NAME,
            Some(prefix_count),
        )
    }

    pub fn last_excluding(
        name: Name,
        omissions: &[Component],
        prefix_count: Option<usize>,
    ) -> Result<Self, ExcludeError> {
        let filter = ExcludeFilter::factory(omissions)?;
        Ok(Self::next_or_last(
            name,
            filter,
            OrderPreference::RIGHT | OrderPreference::ORDER_NAME,
            prefix_count,
        ))
    }

    pub fn last_with_filter(name: Name, filter: ExcludeFilter) -> Self {
        Self::next_or_last(
            name,
            Some(filter),
            OrderPreference::RIGHT | OrderPreference::ORDER_NAME,
            None,
        )
    }

    /// Interest excluding a set of components under `name`, no ordering
    pub fn exclude(name: Name, omissions: &[Component]) -> Result<Self, ExcludeError> {
        Self::exclude_with(name, omissions, None, None)
    }

    pub fn exclude_with(
        name: Name,
        omissions: &[Component],
        publisher: Option<PublisherId>,
        additional_name_components: Option<usize>,
    ) -> Result<Self, ExcludeError> {
        let filter = ExcludeFilter::from_components(omissions.to_vec())?;
        Ok(Self::construct(
            name,
            Some(filter),
            None,
            None,
            publisher,
            additional_name_components,
        ))
    }

    /// Populate whichever constraints are given
    pub fn construct(
        name: Name,
        filter: Option<ExcludeFilter>,
        order_preference: Option<OrderPreference>,
        prefix_count: Option<usize>,
        publisher: Option<PublisherId>,
        additional_name_components: Option<usize>,
    ) -> Self {
        Self {
            name_component_count: prefix_count,
            additional_name_components,
            publisher_id: publisher,
            exclude_filter: filter,
            order_preference,
            ..Self::new(name)
        }
    }

    fn next_or_last(
        name: Name,
        filter: Option<ExcludeFilter>,
        order: OrderPreference,
        prefix_count: Option<usize>,
    ) -> Self {
        let prefix = prefix_count.unwrap_or_else(|| name.count().saturating_sub(1));
        Self::construct(name, filter, Some(order), Some(prefix), None, None)
    }

    /// Check field combinations the protocol forbids
    pub fn validate(&self) -> Result<(), CodecError> {
        if let Some(kind) = self.answer_origin_kind {
            if kind == AnswerOriginKind::GENERATED {
                return Err(CodecError::InvalidField {
                    field: "AnswerOriginKind",
                    reason: "may not be GENERATED alone",
                });
            }
            if kind.contains(AnswerOriginKind::MARK_STALE) && self.scope != Some(0) {
                return Err(CodecError::InvalidField {
                    field: "AnswerOriginKind",
                    reason: "MARK_STALE requires scope 0",
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        if let Some(count) = self.name_component_count {
            write!(f, " ct:{}", count)?;
        }
        if let Some(additional) = self.additional_name_components {
            write!(f, " anc:{}", additional)?;
        }
        if let Some(publisher) = &self.publisher_id {
            write!(f, " p:{}", hex::encode(publisher.id))?;
        }
        if let Some(filter) = &self.exclude_filter {
            write!(f, " ex({}):[{}]", filter.len(), filter.summary())?;
        }
        Ok(())
    }
}
