//! Per-name fan-out
//!
//! A `BasenameState` owns the manager for one base name and the set of
//! listeners registered for it. The manager delivers each new version to
//! the state, which hands it to every listener in turn.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use ccn_01_interest_matching::{ContentObject, Interest, Name, TrustManager};
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::domain::{VersionNumber, VersioningConfig};
use crate::error::{ListenerError, VersioningError};
use crate::metrics::MetricsSnapshot;
use crate::ports::inbound::same_listener;
use crate::ports::{ContentListener, InterestTransport, SharedListener};
use crate::service::manager::VersioningInterestManager;

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Manager and listener set for one base name
pub struct BasenameState<T: InterestTransport> {
    basename: Name,
    manager: VersioningInterestManager<T>,
    listeners: Mutex<Vec<SharedListener>>,
    state: AtomicU8,
    listener_failures: AtomicU64,
}

impl<T: InterestTransport> BasenameState<T> {
    /// Build a stopped-until-started state whose manager reports back to it
    pub fn new(
        basename: Name,
        config: VersioningConfig,
        transport: Arc<T>,
        trust: Arc<dyn TrustManager>,
        exclusions: impl IntoIterator<Item = VersionNumber>,
        starting_version: Option<VersionNumber>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let owner: Weak<dyn ContentListener> = me.clone();
            Self {
                manager: VersioningInterestManager::new(
                    basename.clone(),
                    config,
                    transport,
                    trust,
                    owner,
                    exclusions,
                    starting_version,
                ),
                basename,
                listeners: Mutex::new(Vec::new()),
                state: AtomicU8::new(CREATED),
                listener_failures: AtomicU64::new(0),
            }
        })
    }

    /// Open fan-out and start the manager
    ///
    /// Only the first call has any effect.
    pub fn start(&self) -> Result<(), VersioningError> {
        if self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }
        debug!(basename = %self.basename, "[BasenameState] Starting");
        self.manager.start()
    }

    /// Close fan-out without touching the manager
    ///
    /// Used under the registry lock; [`Self::stop`] finishes the job.
    pub fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }

    /// Close fan-out and stop the manager
    pub fn stop(&self) {
        self.mark_stopped();
        self.manager.stop();
        debug!(basename = %self.basename, "[BasenameState] Stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Add `listener`; false if it is already registered
    pub fn add_listener(&self, listener: SharedListener) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove `listener`; false if it was not registered
    pub fn remove_listener(&self, listener: &SharedListener) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    fn is_registered(&self, listener: &SharedListener) -> bool {
        self.listeners.lock().iter().any(|l| same_listener(l, listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Listener calls that returned an error or panicked
    pub fn listener_failures(&self) -> u64 {
        self.listener_failures.load(Ordering::Relaxed)
    }

    pub fn basename(&self) -> &Name {
        &self.basename
    }

    pub fn manager(&self) -> &VersioningInterestManager<T> {
        &self.manager
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.manager.metrics()
    }

    pub fn refresh_expired(&self, now: Instant) -> usize {
        self.manager.refresh_expired(now)
    }

    fn deliver(&self, listener: &SharedListener, content: &ContentObject, interest: &Interest) {
        match catch_unwind(AssertUnwindSafe(|| listener.on_content(content, interest))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.listener_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    basename = %self.basename,
                    content = %content.name(),
                    error = %e,
                    "[BasenameState] Listener failed"
                );
            }
            Err(_) => {
                self.listener_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    basename = %self.basename,
                    content = %content.name(),
                    "[BasenameState] Listener panicked"
                );
            }
        }
    }
}

impl<T: InterestTransport> ContentListener for BasenameState<T> {
    fn on_content(&self, content: &ContentObject, interest: &Interest) -> Result<(), ListenerError> {
        if !self.is_running() {
            return Ok(());
        }
        // Listeners may cancel themselves from the callback
        let listeners: Vec<SharedListener> = self.listeners.lock().clone();
        for listener in &listeners {
            if !self.is_running() {
                debug!(basename = %self.basename, "[BasenameState] Stopped during fan-out");
                break;
            }
            // Removed by an earlier listener in this round
            if !self.is_registered(listener) {
                continue;
            }
            self.deliver(listener, content, interest);
        }
        Ok(())
    }
}
