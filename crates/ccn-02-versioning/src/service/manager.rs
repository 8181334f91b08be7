//! Versioning Interest Manager
//!
//! Per-name retrieval state machine: `Created -> Running -> Stopped`.
//! Stopped is terminal.
//!
//! While running the manager keeps one outstanding Interest per exclusion
//! partition. Each arrival is decoded to a version. A new version is added
//! to the exclusion set, delivered to the owner unless it is below the
//! floor, and the affected partitions are re-expressed with the grown
//! filter.
//!
//! An arrival whose component after the base name is not a version is
//! recorded as a stray in the partition that asked for it, so the reissued
//! Interest excludes it. An arrival with no component there leaves the
//! partition idle until the next refresh.
//!
//! State changes happen under the state lock and produce a list of
//! transport actions. Actions and owner delivery run after the lock is
//! released, since the transport may call back into the manager on the
//! same thread.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::time::Instant;

use ccn_01_interest_matching::{ContentObject, Interest, Name, TrustManager};
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::domain::{ExclusionPartition, VersionNumber, VersioningConfig};
use crate::error::{TransportError, VersionError, VersioningError};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::ports::{ContentHandler, ContentListener, InterestTransport};

/// Lifecycle of a manager
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagerLifecycle {
    Created,
    Running,
    Stopped,
}

/// One partition and the Interest currently expressed for it
#[derive(Debug)]
struct PartitionSlot {
    partition: ExclusionPartition,
    outstanding: Option<Interest>,
    expressed_at: Option<Instant>,
}

impl PartitionSlot {
    fn new(partition: ExclusionPartition) -> Self {
        Self {
            partition,
            outstanding: None,
            expressed_at: None,
        }
    }
}

#[derive(Debug)]
struct ManagerState {
    lifecycle: ManagerLifecycle,
    /// Contiguous partitions ordered by lower bound
    slots: Vec<PartitionSlot>,
}

#[derive(Debug)]
enum Action {
    Express(Interest),
    Cancel(Interest),
}

/// Outcome of one arrival, computed under the lock
enum Arrival {
    Deliver,
    Drop,
}

/// Continuously retrieves unseen versions under one base name
pub struct VersioningInterestManager<T: InterestTransport> {
    inner: Arc<ManagerInner<T>>,
}

struct ManagerInner<T: InterestTransport> {
    basename: Name,
    config: VersioningConfig,
    transport: Arc<T>,
    /// Re-checks arrivals against the Interest they answered
    trust: Arc<dyn TrustManager>,
    /// Receives new versions; usually the owning `BasenameState`
    owner: Weak<dyn ContentListener>,
    starting_version: Option<VersionNumber>,
    me: Weak<ManagerInner<T>>,
    state: Mutex<ManagerState>,
    metrics: Metrics,
}

impl<T: InterestTransport> VersioningInterestManager<T> {
    /// Create a manager in the `Created` state
    ///
    /// `exclusions` are versions never to be retrieved. Versions below
    /// `starting_version` are excluded on arrival but not delivered.
    pub fn new(
        basename: Name,
        config: VersioningConfig,
        transport: Arc<T>,
        trust: Arc<dyn TrustManager>,
        owner: Weak<dyn ContentListener>,
        exclusions: impl IntoIterator<Item = VersionNumber>,
        starting_version: Option<VersionNumber>,
    ) -> Self {
        let exclusions: BTreeSet<VersionNumber> = exclusions.into_iter().collect();
        let slots = ExclusionPartition::cover(&exclusions, config.max_excludes_per_interest)
            .into_iter()
            .map(PartitionSlot::new)
            .collect();

        let inner = Arc::new_cyclic(|me| ManagerInner {
            basename,
            config,
            transport,
            trust,
            owner,
            starting_version,
            me: me.clone(),
            state: Mutex::new(ManagerState {
                lifecycle: ManagerLifecycle::Created,
                slots,
            }),
            metrics: Metrics::new(),
        });
        Self { inner }
    }

    /// Express one Interest per partition
    ///
    /// A no-op unless the manager is `Created`. Returns the first transport
    /// failure; failed partitions are retried by [`Self::refresh_expired`].
    pub fn start(&self) -> Result<(), VersioningError> {
        self.inner.start()
    }

    /// Cancel every outstanding Interest and stop for good
    pub fn stop(&self) {
        self.inner.stop()
    }

    /// Reissue Interests that lapsed or whose expression failed
    ///
    /// Returns the number of Interests reissued.
    pub fn refresh_expired(&self, now: Instant) -> usize {
        self.inner.refresh_expired(now)
    }

    pub fn handle_content(&self, content: &ContentObject, interest: &Interest) {
        self.inner.handle_content(content, interest)
    }

    pub fn handle_timeout(&self, interest: &Interest) {
        self.inner.handle_timeout(interest)
    }

    pub fn basename(&self) -> &Name {
        &self.inner.basename
    }

    pub fn starting_version(&self) -> Option<VersionNumber> {
        self.inner.starting_version
    }

    pub fn trust_manager(&self) -> &Arc<dyn TrustManager> {
        &self.inner.trust
    }

    pub fn lifecycle(&self) -> ManagerLifecycle {
        self.inner.state.lock().lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Versions excluded across all partitions
    pub fn exclusion_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.slots.iter().map(|s| s.partition.excluded_count()).sum()
    }

    pub fn partition_count(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    /// Non-version components excluded across all partitions
    pub fn stray_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.slots.iter().map(|s| s.partition.stray_count()).sum()
    }

    /// Interests currently expressed, in partition order
    pub fn outstanding_interests(&self) -> Vec<Interest> {
        let state = self.inner.state.lock();
        state
            .slots
            .iter()
            .filter_map(|s| s.outstanding.clone())
            .collect()
    }

    /// Has `version` been seen or supplied as an exclusion?
    pub fn is_excluded(&self, version: VersionNumber) -> bool {
        let state = self.inner.state.lock();
        state
            .slots
            .iter()
            .any(|s| s.partition.covers(version) && s.partition.is_excluded(version))
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

impl<T: InterestTransport> ManagerInner<T> {
    fn is_running(&self) -> bool {
        self.state.lock().lifecycle == ManagerLifecycle::Running
    }

    fn is_outstanding(&self, interest: &Interest) -> bool {
        let state = self.state.lock();
        state
            .slots
            .iter()
            .any(|s| s.outstanding.as_ref() == Some(interest))
    }

    fn handler(&self) -> Option<Arc<dyn ContentHandler>> {
        self.me
            .upgrade()
            .map(|inner| inner as Arc<dyn ContentHandler>)
    }

    fn start(&self) -> Result<(), VersioningError> {
        let actions = {
            let mut state = self.state.lock();
            if state.lifecycle != ManagerLifecycle::Created {
                debug!(
                    basename = %self.basename,
                    lifecycle = ?state.lifecycle,
                    "[VersioningInterestManager] Start ignored"
                );
                return Ok(());
            }
            state.lifecycle = ManagerLifecycle::Running;

            let now = Instant::now();
            let mut actions = Vec::with_capacity(state.slots.len());
            for slot in state.slots.iter_mut() {
                self.reissue(slot, now, &mut actions);
            }
            actions
        };

        debug!(
            basename = %self.basename,
            interests = actions.len(),
            "[VersioningInterestManager] Started"
        );
        self.execute(actions).map_err(VersioningError::from)
    }

    fn stop(&self) {
        let actions: Vec<Action> = {
            let mut state = self.state.lock();
            if state.lifecycle == ManagerLifecycle::Stopped {
                return;
            }
            state.lifecycle = ManagerLifecycle::Stopped;
            state
                .slots
                .iter_mut()
                .filter_map(|slot| {
                    slot.expressed_at = None;
                    slot.outstanding.take().map(Action::Cancel)
                })
                .collect()
        };

        debug!(
            basename = %self.basename,
            cancelled = actions.len(),
            "[VersioningInterestManager] Stopped"
        );
        // Cancels cannot fail
        let _ = self.execute(actions);
    }

    fn refresh_expired(&self, now: Instant) -> usize {
        let actions = {
            let mut state = self.state.lock();
            if state.lifecycle != ManagerLifecycle::Running {
                return 0;
            }
            let lifetime = self.config.interest_lifetime;
            let mut actions = Vec::new();
            for slot in state.slots.iter_mut() {
                let expired = match slot.expressed_at {
                    Some(at) => now.saturating_duration_since(at) >= lifetime,
                    None => true,
                };
                if slot.outstanding.is_none() || expired {
                    if let Some(old) = slot.outstanding.take() {
                        actions.push(Action::Cancel(old));
                    }
                    self.reissue(slot, now, &mut actions);
                }
            }
            actions
        };

        let reissued = actions
            .iter()
            .filter(|a| matches!(a, Action::Express(_)))
            .count();
        if reissued > 0 {
            debug!(
                basename = %self.basename,
                reissued,
                "[VersioningInterestManager] Reissued expired Interests"
            );
        }
        if let Err(e) = self.execute(actions) {
            warn!(
                basename = %self.basename,
                error = %e,
                "[VersioningInterestManager] Reissue failed, will retry"
            );
        }
        reissued
    }

    fn handle_timeout(&self, interest: &Interest) {
        let actions = {
            let mut state = self.state.lock();
            if state.lifecycle != ManagerLifecycle::Running {
                return;
            }
            let Some(slot) = state
                .slots
                .iter_mut()
                .find(|s| s.outstanding.as_ref() == Some(interest))
            else {
                trace!(
                    basename = %self.basename,
                    "[VersioningInterestManager] Timeout for an Interest no longer outstanding"
                );
                return;
            };
            self.metrics.record_timeout();
            slot.outstanding = None;
            let mut actions = Vec::with_capacity(1);
            self.reissue(slot, Instant::now(), &mut actions);
            actions
        };

        if let Err(e) = self.execute(actions) {
            warn!(
                basename = %self.basename,
                error = %e,
                "[VersioningInterestManager] Reissue after timeout failed, will retry"
            );
        }
    }

    fn handle_content(&self, content: &ContentObject, interest: &Interest) {
        let mut actions = Vec::new();
        let arrival = {
            let mut state = self.state.lock();
            if state.lifecycle != ManagerLifecycle::Running {
                trace!(
                    basename = %self.basename,
                    content = %content.name(),
                    "[VersioningInterestManager] Dropping arrival, not running"
                );
                return;
            }
            self.absorb(&mut state, content, interest, &mut actions)
        };

        if let Err(e) = self.execute(actions) {
            warn!(
                basename = %self.basename,
                error = %e,
                "[VersioningInterestManager] Re-expression failed, will retry"
            );
        }

        if let Arrival::Deliver = arrival {
            // Stop may have raced with the re-expression above
            if !self.is_running() {
                return;
            }
            match self.owner.upgrade() {
                Some(owner) => {
                    if let Err(e) = owner.on_content(content, interest) {
                        warn!(
                            basename = %self.basename,
                            error = %e,
                            "[VersioningInterestManager] Owner rejected content"
                        );
                    }
                }
                None => debug!(
                    basename = %self.basename,
                    "[VersioningInterestManager] Owner dropped, content not delivered"
                ),
            }
        }
    }

    /// Fold one arrival into the partitions; runs under the state lock
    fn absorb(
        &self,
        state: &mut ManagerState,
        content: &ContentObject,
        interest: &Interest,
        actions: &mut Vec<Action>,
    ) -> Arrival {
        let now = Instant::now();
        let consumed = state
            .slots
            .iter()
            .position(|s| s.outstanding.as_ref() == Some(interest));
        if let Some(index) = consumed {
            state.slots[index].outstanding = None;
            state.slots[index].expressed_at = None;
        }

        if !interest.matches_content_with(content, self.trust.as_ref()) {
            debug!(
                basename = %self.basename,
                content = %content.name(),
                "[VersioningInterestManager] Arrival does not match its Interest"
            );
            self.reissue_consumed(state, consumed, now, actions);
            return Arrival::Drop;
        }

        let index = self.basename.count();
        let version = match VersionNumber::from_name_at(content.name(), index) {
            Ok(version) => version,
            Err(e @ VersionError::MissingComponent { .. }) => {
                // Nothing to exclude: reissuing now would fetch the same content
                debug!(
                    basename = %self.basename,
                    content = %content.name(),
                    error = %e,
                    "[VersioningInterestManager] Arrival ends at the base name, waiting for refresh"
                );
                return Arrival::Drop;
            }
            Err(e) => {
                let stray = content.name().component(index);
                if let (Some(slot), Some(component)) = (consumed, stray) {
                    state.slots[slot].partition.insert_stray(component.to_vec());
                }
                debug!(
                    basename = %self.basename,
                    content = %content.name(),
                    error = %e,
                    "[VersioningInterestManager] Arrival has no version component, excluding it"
                );
                self.reissue_consumed(state, consumed, now, actions);
                return Arrival::Drop;
            }
        };

        let Some(target) = state.slots.iter().position(|s| s.partition.covers(version)) else {
            error!(
                basename = %self.basename,
                %version,
                "[VersioningInterestManager] No partition covers version"
            );
            self.reissue_consumed(state, consumed, now, actions);
            return Arrival::Drop;
        };

        if !state.slots[target].partition.insert(version) {
            self.metrics.record_duplicate();
            trace!(
                basename = %self.basename,
                %version,
                "[VersioningInterestManager] Duplicate version suppressed"
            );
            self.reissue_consumed(state, consumed, now, actions);
            return Arrival::Drop;
        }

        let arrival = match self.starting_version {
            Some(floor) if version < floor => {
                self.metrics.record_below_floor();
                trace!(
                    basename = %self.basename,
                    %version,
                    %floor,
                    "[VersioningInterestManager] Version below starting version"
                );
                Arrival::Drop
            }
            _ => {
                self.metrics.record_delivered();
                debug!(
                    basename = %self.basename,
                    %version,
                    "[VersioningInterestManager] New version"
                );
                Arrival::Deliver
            }
        };

        if consumed.is_some() && consumed != Some(target) {
            self.reissue_consumed(state, consumed, now, actions);
        }

        // The target's filter grew: replace its Interest
        if let Some(old) = state.slots[target].outstanding.take() {
            actions.push(Action::Cancel(old));
        }
        if state.slots[target]
            .partition
            .needs_split(self.config.max_excludes_per_interest)
        {
            self.split(state, target, now, actions);
        } else {
            self.reissue(&mut state.slots[target], now, actions);
        }
        arrival
    }

    fn reissue_consumed(
        &self,
        state: &mut ManagerState,
        consumed: Option<usize>,
        now: Instant,
        actions: &mut Vec<Action>,
    ) {
        if let Some(index) = consumed {
            self.reissue(&mut state.slots[index], now, actions);
        }
    }

    /// Replace the slot at `index` with its two halves, both expressed
    fn split(&self, state: &mut ManagerState, index: usize, now: Instant, actions: &mut Vec<Action>) {
        let slot = state.slots.remove(index);
        let (left, right) = slot.partition.split();
        let mut left = PartitionSlot::new(left);
        self.reissue(&mut left, now, actions);
        state.slots.insert(index, left);

        if let Some(right) = right {
            self.metrics.record_split();
            let mut right = PartitionSlot::new(right);
            self.reissue(&mut right, now, actions);
            state.slots.insert(index + 1, right);
            debug!(
                basename = %self.basename,
                partitions = state.slots.len(),
                "[VersioningInterestManager] Split exclusion partition"
            );
        }
    }

    /// Mark `slot` outstanding with a fresh Interest and queue its expression
    fn reissue(&self, slot: &mut PartitionSlot, now: Instant, actions: &mut Vec<Action>) {
        match slot.partition.interest(&self.basename, &self.config) {
            Ok(interest) => {
                slot.outstanding = Some(interest.clone());
                slot.expressed_at = Some(now);
                actions.push(Action::Express(interest));
            }
            Err(e) => {
                error!(
                    basename = %self.basename,
                    error = %e,
                    "[VersioningInterestManager] Cannot build partition Interest"
                );
                slot.outstanding = None;
                slot.expressed_at = None;
            }
        }
    }

    /// Run transport actions; returns the first expression failure
    fn execute(&self, actions: Vec<Action>) -> Result<(), TransportError> {
        let Some(handler) = self.handler() else {
            return Ok(());
        };

        let mut first_error = None;
        for action in actions {
            match action {
                Action::Cancel(interest) => {
                    self.transport.cancel_interest(&interest, &handler);
                    self.metrics.record_cancelled();
                }
                Action::Express(interest) => {
                    match self.transport.express_interest(&interest, Arc::clone(&handler)) {
                        Ok(()) => {
                            self.metrics.record_expressed();
                            // Stop ran between queueing and expressing
                            if !self.is_running() {
                                self.transport.cancel_interest(&interest, &handler);
                                self.metrics.record_cancelled();
                            } else if !self.is_outstanding(&interest) {
                                // Answered inline, or replaced by a concurrent arrival
                                // whose cancel ran before this expression
                                self.transport.cancel_interest(&interest, &handler);
                                trace!(
                                    basename = %self.basename,
                                    "[VersioningInterestManager] Withdrew superseded Interest"
                                );
                            }
                        }
                        Err(e) => {
                            self.metrics.record_express_failure();
                            warn!(
                                basename = %self.basename,
                                error = %e,
                                "[VersioningInterestManager] Failed to express Interest"
                            );
                            self.forget(&interest);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Clear the slot still waiting on `interest` so a refresh retries it
    fn forget(&self, interest: &Interest) {
        let mut state = self.state.lock();
        if let Some(slot) = state
            .slots
            .iter_mut()
            .find(|s| s.outstanding.as_ref() == Some(interest))
        {
            slot.outstanding = None;
            slot.expressed_at = None;
        }
    }
}

impl<T: InterestTransport> ContentHandler for ManagerInner<T> {
    fn handle_content(&self, content: &ContentObject, interest: &Interest) {
        ManagerInner::handle_content(self, content, interest)
    }

    fn handle_timeout(&self, interest: &Interest) {
        ManagerInner::handle_timeout(self, interest)
    }
}
