//! Counters for versioned retrieval
//!
//! One [`Metrics`] per manager. Read with [`Metrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Thread-safe counters for a `VersioningInterestManager`
#[derive(Debug, Default)]
pub struct Metrics {
    /// Interests handed to the transport
    pub interests_expressed: AtomicU64,
    /// Interests cancelled at the transport
    pub interests_cancelled: AtomicU64,
    /// Expressions the transport refused
    pub express_failures: AtomicU64,
    /// New versions passed to the owner
    pub versions_delivered: AtomicU64,
    /// Content for a version already excluded
    pub duplicates_suppressed: AtomicU64,
    /// New versions below the starting version
    pub below_floor: AtomicU64,
    /// Partition splits
    pub partition_splits: AtomicU64,
    /// Interests that expired at the transport
    pub timeouts: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_expressed(&self) {
        self.interests_expressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.interests_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_express_failure(&self) {
        self.express_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.versions_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_below_floor(&self) {
        self.below_floor.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_split(&self) {
        self.partition_splits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            interests_expressed: self.interests_expressed.load(Ordering::Relaxed),
            interests_cancelled: self.interests_cancelled.load(Ordering::Relaxed),
            express_failures: self.express_failures.load(Ordering::Relaxed),
            versions_delivered: self.versions_delivered.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            below_floor: self.below_floor.load(Ordering::Relaxed),
            partition_splits: self.partition_splits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub interests_expressed: u64,
    pub interests_cancelled: u64,
    pub express_failures: u64,
    pub versions_delivered: u64,
    pub duplicates_suppressed: u64,
    pub below_floor: u64,
    pub partition_splits: u64,
    pub timeouts: u64,
}
