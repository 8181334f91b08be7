//! Versioned retrieval registry
//!
//! Maps each base name to its [`BasenameState`]. Creating a state when the
//! first listener arrives and discarding it when the last one leaves both
//! happen inside one critical section on the map. Starting and stopping
//! managers happen after that lock is released, because the transport may
//! deliver content, and so call listeners, from inside those calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ccn_01_interest_matching::{ExactKeyTrustManager, Name, TrustManager};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::{VersionNumber, VersioningConfig};
use crate::error::VersioningError;
use crate::ports::{InterestTransport, SharedListener, VersioningApi};
use crate::service::basename::BasenameState;

/// Registry of versioned retrievals, one per base name
pub struct VersioningInterest<T: InterestTransport> {
    transport: Arc<T>,
    config: VersioningConfig,
    /// Handed to every manager for publisher checks
    trust: Arc<dyn TrustManager>,
    states: Mutex<HashMap<Name, Arc<BasenameState<T>>>>,
}

impl<T: InterestTransport> VersioningInterest<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            config: VersioningConfig::default(),
            trust: Arc::new(ExactKeyTrustManager),
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_config(transport: Arc<T>, config: VersioningConfig) -> Result<Self, VersioningError> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            trust: Arc::new(ExactKeyTrustManager),
            states: Mutex::new(HashMap::new()),
        })
    }

    /// Use `trust` instead of exact key comparison for retrievals created from now on
    pub fn with_trust_manager(mut self, trust: Arc<dyn TrustManager>) -> Self {
        self.trust = trust;
        self
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn trust_manager(&self) -> &Arc<dyn TrustManager> {
        &self.trust
    }

    /// Register `listener` for every new version under `name`
    pub fn express_interest(&self, name: &Name, listener: SharedListener) -> Result<(), VersioningError> {
        self.express_interest_excluding(name, listener, &[], None)
    }

    /// Register `listener`, seeding a new retrieval with `exclusions` and a floor
    ///
    /// When `name` is already registered the listener joins the existing
    /// retrieval and `exclusions` and `starting_version` are ignored.
    pub fn express_interest_excluding(
        &self,
        name: &Name,
        listener: SharedListener,
        exclusions: &[VersionNumber],
        starting_version: Option<VersionNumber>,
    ) -> Result<(), VersioningError> {
        let created = {
            let mut states = self.states.lock();
            match states.get(name) {
                Some(state) => {
                    let added = state.add_listener(Arc::clone(&listener));
                    debug!(
                        basename = %name,
                        added,
                        listeners = state.listener_count(),
                        "[VersioningInterest] Joined existing retrieval"
                    );
                    None
                }
                None => {
                    let state = BasenameState::new(
                        name.clone(),
                        self.config.clone(),
                        Arc::clone(&self.transport),
                        Arc::clone(&self.trust),
                        exclusions.iter().copied(),
                        starting_version,
                    );
                    state.add_listener(Arc::clone(&listener));
                    states.insert(name.clone(), Arc::clone(&state));
                    Some(state)
                }
            }
        };

        let Some(state) = created else {
            return Ok(());
        };

        info!(
            basename = %name,
            exclusions = exclusions.len(),
            starting_version = ?starting_version,
            "[VersioningInterest] Starting retrieval"
        );
        if let Err(e) = state.start() {
            warn!(
                basename = %name,
                error = %e,
                "[VersioningInterest] Initial expression failed, rolling back"
            );
            self.cancel_interest(name, &listener);
            return Err(e);
        }
        Ok(())
    }

    /// Remove `listener` from `name`; the last listener stops the retrieval
    ///
    /// Returns false if the listener was not registered for `name`.
    pub fn cancel_interest(&self, name: &Name, listener: &SharedListener) -> bool {
        let (removed, emptied) = {
            let mut states = self.states.lock();
            let Some(state) = states.get(name) else {
                return false;
            };
            let removed = state.remove_listener(listener);
            if removed && state.is_empty() {
                state.mark_stopped();
                (removed, states.remove(name))
            } else {
                (removed, None)
            }
        };

        if let Some(state) = emptied {
            state.stop();
            info!(basename = %name, "[VersioningInterest] Last listener left, retrieval stopped");
        }
        removed
    }

    /// Stop and discard every retrieval
    pub fn close(&self) {
        let drained: Vec<Arc<BasenameState<T>>> = {
            let mut states = self.states.lock();
            states
                .drain()
                .map(|(_, state)| {
                    state.mark_stopped();
                    state
                })
                .collect()
        };
        if drained.is_empty() {
            return;
        }

        for state in &drained {
            state.stop();
        }
        info!(stopped = drained.len(), "[VersioningInterest] Closed");
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.states.lock().contains_key(name)
    }

    /// Number of registered base names
    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }

    pub fn listener_count(&self, name: &Name) -> usize {
        self.states
            .lock()
            .get(name)
            .map_or(0, |state| state.listener_count())
    }

    /// State for `name`, if registered
    pub fn state(&self, name: &Name) -> Option<Arc<BasenameState<T>>> {
        self.states.lock().get(name).cloned()
    }

    /// Reissue lapsed or failed Interests across every retrieval
    pub fn refresh_expired(&self, now: Instant) -> usize {
        let states: Vec<Arc<BasenameState<T>>> = self.states.lock().values().cloned().collect();
        states.iter().map(|state| state.refresh_expired(now)).sum()
    }

    /// Call [`Self::refresh_expired`] every `refresh_interval` until shutdown
    ///
    /// The caller spawns this; send `true` on the watch channel, or drop
    /// its sender, to end it.
    pub async fn run_refresh_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.config.refresh_interval.as_millis() as u64,
            "[VersioningInterest] Refresh loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reissued = self.refresh_expired(Instant::now());
                    if reissued > 0 {
                        debug!(reissued, "[VersioningInterest] Refresh tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[VersioningInterest] Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }
}

impl<T: InterestTransport> Drop for VersioningInterest<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: InterestTransport> VersioningApi for VersioningInterest<T> {
    fn express_interest(&self, name: &Name, listener: SharedListener) -> Result<(), VersioningError> {
        VersioningInterest::express_interest(self, name, listener)
    }

    fn express_interest_excluding(
        &self,
        name: &Name,
        listener: SharedListener,
        exclusions: &[VersionNumber],
        starting_version: Option<VersionNumber>,
    ) -> Result<(), VersioningError> {
        VersioningInterest::express_interest_excluding(self, name, listener, exclusions, starting_version)
    }

    fn cancel_interest(&self, name: &Name, listener: &SharedListener) -> bool {
        VersioningInterest::cancel_interest(self, name, listener)
    }

    fn close(&self) {
        VersioningInterest::close(self)
    }
}
