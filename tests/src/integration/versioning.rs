//! # Versioned Retrieval Flows
//!
//! The registry driven through the in-memory transport:
//!
//! ```text
//! [Publisher threads] ──publish──→ [InMemoryTransport]
//!                                        │ answers pending Interests
//!                                        ↓
//!                          [VersioningInterestManager] per base name
//!                                        │ new versions only
//!                                        ↓
//!                              [BasenameState] fan-out
//!                                        │
//!                                        ↓
//!                                   [Listeners]
//! ```
//!
//! ## Test Categories
//!
//! 1. **Exactly Once**: concurrent publishers, two base names
//! 2. **Registration**: idempotence, sharing, cancellation
//! 3. **Exclusions**: initial exclusions, floor, partition splits, stray components
//! 4. **Isolation**: failing and panicking listeners

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use parking_lot::Mutex;

#[cfg(test)]
use ccn_01_interest_matching::{ContentObject, Interest, Name};

#[cfg(test)]
use ccn_02_versioning::{ContentListener, ListenerError, VersionNumber};

/// Listener recording the version of every delivery
#[cfg(test)]
#[derive(Default)]
struct VersionLog {
    /// Component index of the version
    index: usize,
    versions: Mutex<Vec<VersionNumber>>,
}

#[cfg(test)]
impl VersionLog {
    fn at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            index,
            versions: Mutex::new(Vec::new()),
        })
    }

    fn sorted(&self) -> Vec<VersionNumber> {
        let mut versions = self.versions.lock().clone();
        versions.sort();
        versions
    }
}

#[cfg(test)]
impl ContentListener for VersionLog {
    fn on_content(&self, content: &ContentObject, _: &Interest) -> Result<(), ListenerError> {
        let version = VersionNumber::from_name_at(content.name(), self.index)
            .map_err(|e| ListenerError(e.to_string()))?;
        self.versions.lock().push(version);
        Ok(())
    }
}

/// `basename/version/seg0`; the digest stays implicit
#[cfg(test)]
fn versioned(basename: &Name, ticks: u64) -> ContentObject {
    let version = VersionNumber::from_ticks(ticks).unwrap();
    let name = version.append_to(basename).append(b"seg0".to_vec());
    ContentObject::unsigned(name, format!("{} {}", basename, ticks).into_bytes())
}

#[cfg(test)]
fn v(ticks: u64) -> VersionNumber {
    VersionNumber::from_ticks(ticks).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    use ccn_02_versioning::testing::InMemoryTransport;
    use ccn_02_versioning::{
        SharedListener, VersioningApi, VersioningConfig, VersioningError, VersioningInterest,
    };
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn registry() -> (Arc<InMemoryTransport>, VersioningInterest<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (Arc::clone(&transport), VersioningInterest::new(transport))
    }

    #[test]
    fn test_concurrent_publishers_deliver_each_version_exactly_once() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let first = Name::from_uri("/a/b").unwrap();
        let second = Name::from_uri("/a/c").unwrap();

        let first_a = VersionLog::at(2);
        let first_b = VersionLog::at(2);
        let second_log = VersionLog::at(2);
        registry.express_interest(&first, first_a.clone()).unwrap();
        registry.express_interest(&first, first_b.clone()).unwrap();
        registry.express_interest(&second, second_log.clone()).unwrap();

        let publishers: Vec<_> = [(first.clone(), 1u64), (second.clone(), 2u64)]
            .into_iter()
            .map(|(basename, seed)| {
                let transport = Arc::clone(&transport);
                thread::spawn(move || {
                    let mut ticks: Vec<u64> = (1..=50).collect();
                    ticks.shuffle(&mut StdRng::seed_from_u64(seed));
                    for t in ticks {
                        transport.publish(versioned(&basename, t));
                    }
                })
            })
            .collect();
        for publisher in publishers {
            publisher.join().unwrap();
        }

        let expected: Vec<VersionNumber> = (1..=50).map(v).collect();
        let deadline = Instant::now() + Duration::from_secs(5);
        while second_log.sorted().len() < 50 || first_a.sorted().len() < 50 {
            assert!(Instant::now() < deadline, "deliveries did not complete");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(first_a.sorted(), expected);
        assert_eq!(first_b.sorted(), expected);
        assert_eq!(second_log.sorted(), expected);
        assert_eq!(transport.pending_count(), 2);
    }

    #[test]
    fn test_double_registration_delivers_once() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/a/b").unwrap();
        let log = VersionLog::at(2);
        let listener: SharedListener = log.clone();
        registry.express_interest(&basename, Arc::clone(&listener)).unwrap();
        registry.express_interest(&basename, Arc::clone(&listener)).unwrap();

        for t in [3, 1, 2] {
            transport.publish(versioned(&basename, t));
        }
        assert_eq!(log.sorted(), vec![v(1), v(2), v(3)]);
    }

    #[test]
    fn test_cancelling_sole_listener_stops_retrieval() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/a/b").unwrap();
        let log = VersionLog::at(2);
        let listener: SharedListener = log.clone();
        registry.express_interest(&basename, Arc::clone(&listener)).unwrap();
        transport.publish(versioned(&basename, 1));
        let state = registry.state(&basename).unwrap();
        let expressed = state.metrics().interests_expressed;

        assert!(registry.cancel_interest(&basename, &listener));
        assert!(!registry.contains(&basename));
        assert_eq!(transport.pending_count(), 0);

        // Nothing is reissued and nothing more is delivered
        transport.publish(versioned(&basename, 2));
        transport.expire_all();
        assert_eq!(registry.refresh_expired(Instant::now() + Duration::from_secs(60)), 0);
        assert_eq!(state.metrics().interests_expressed, expressed);
        assert_eq!(log.sorted(), vec![v(1)]);
    }

    #[test]
    fn test_new_listener_only_sees_versions_not_yet_excluded() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/a/b").unwrap();
        let early = VersionLog::at(2);
        let late = VersionLog::at(2);
        registry.express_interest(&basename, early.clone()).unwrap();
        transport.publish(versioned(&basename, 1));

        registry.express_interest(&basename, late.clone()).unwrap();
        transport.publish(versioned(&basename, 2));

        assert_eq!(early.sorted(), vec![v(1), v(2)]);
        assert_eq!(late.sorted(), vec![v(2)]);
    }

    #[test]
    fn test_exclusions_and_starting_version() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/feed").unwrap();
        for t in [1, 5, 8, 12, 20] {
            transport.publish(versioned(&basename, t));
        }

        let log = VersionLog::at(1);
        registry
            .express_interest_excluding(&basename, log.clone(), &[v(12)], Some(v(6)))
            .unwrap();
        transport.publish(versioned(&basename, 25));

        assert_eq!(log.sorted(), vec![v(8), v(20), v(25)]);
        let metrics = registry.state(&basename).unwrap().metrics();
        assert_eq!(metrics.below_floor, 2);
        assert_eq!(metrics.versions_delivered, 3);
    }

    #[test]
    fn test_large_exclusion_sets_split_across_interests() {
        crate::init_tracing();
        let transport = Arc::new(InMemoryTransport::new());
        let config = VersioningConfig::default().with_max_excludes(8);
        let registry = VersioningInterest::with_config(Arc::clone(&transport), config).unwrap();
        let basename = Name::from_uri("/a/b").unwrap();
        let seeded: Vec<VersionNumber> = (1..=30).map(|t| v(t * 10)).collect();

        let log = VersionLog::at(2);
        registry
            .express_interest_excluding(&basename, log.clone(), &seeded, None)
            .unwrap();
        let state = registry.state(&basename).unwrap();
        assert!(state.manager().partition_count() > 1);
        assert_eq!(transport.pending_count(), state.manager().partition_count());

        // Seeded versions are never delivered, the gaps between them are
        for t in [10, 15, 150, 155, 300, 301] {
            transport.publish(versioned(&basename, t));
        }
        assert_eq!(log.sorted(), vec![v(15), v(155), v(301)]);
        for interest in transport.pending_interests() {
            let filter = interest.exclude_filter.unwrap();
            assert!(filter.components().len() <= 8 + 2);
        }
    }

    #[test]
    fn test_stray_component_under_the_base_name_is_skipped() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/a/b").unwrap();
        // Starts with the version marker but is too short to be a version
        let stray = basename.append(vec![0xFD, 0x01]).append(b"seg0".to_vec());
        transport.publish(ContentObject::unsigned(stray, b"stray".to_vec()));

        let log = VersionLog::at(2);
        registry.express_interest(&basename, log.clone()).unwrap();
        let state = registry.state(&basename).unwrap();
        assert_eq!(state.manager().stray_count(), 1);
        assert_eq!(transport.pending_count(), 1);

        transport.publish(versioned(&basename, 7));
        transport.expire_all();
        assert_eq!(log.sorted(), vec![v(7)]);
        assert_eq!(state.listener_failures(), 0);
        assert_eq!(transport.pending_count(), 1);
    }

    #[test]
    fn test_failing_listener_does_not_starve_siblings() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let basename = Name::from_uri("/a/b").unwrap();
        let failing: SharedListener =
            Arc::new(|_: &ContentObject, _: &Interest| -> Result<(), ListenerError> {
                Err("cannot store".into())
            });
        let panicking: SharedListener =
            Arc::new(|_: &ContentObject, _: &Interest| -> Result<(), ListenerError> {
                panic!("listener bug")
            });
        let log = VersionLog::at(2);
        registry.express_interest(&basename, failing).unwrap();
        registry.express_interest(&basename, panicking).unwrap();
        registry.express_interest(&basename, log.clone()).unwrap();

        transport.publish(versioned(&basename, 1));
        transport.publish(versioned(&basename, 2));
        assert_eq!(log.sorted(), vec![v(1), v(2)]);
        assert_eq!(registry.listener_count(&basename), 3);
        assert_eq!(registry.state(&basename).unwrap().listener_failures(), 4);
    }

    #[test]
    fn test_registry_behind_the_api_trait() {
        crate::init_tracing();
        let (transport, registry) = registry();
        let api: &dyn VersioningApi = &registry;
        let basename = Name::from_uri("/a/b").unwrap();
        let listener: SharedListener = VersionLog::at(2);

        transport.fail_next_expressions(1);
        assert!(matches!(
            api.express_interest(&basename, Arc::clone(&listener)),
            Err(VersioningError::Transport(_))
        ));
        assert!(registry.is_empty());

        api.express_interest(&basename, Arc::clone(&listener)).unwrap();
        assert!(api.cancel_interest(&basename, &listener));
        api.express_interest(&basename, listener).unwrap();
        api.close();
        assert!(registry.is_empty());
        assert_eq!(transport.pending_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_refresh_loop_keeps_retrieval_alive_through_timeouts() {
        crate::init_tracing();
        let transport = Arc::new(InMemoryTransport::new());
        let config = VersioningConfig::default().with_refresh_interval(Duration::from_millis(10));
        let registry =
            Arc::new(VersioningInterest::with_config(Arc::clone(&transport), config).unwrap());
        let basename = Name::from_uri("/a/b").unwrap();
        let log = VersionLog::at(2);
        registry.express_interest(&basename, log.clone()).unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let looping = Arc::clone(&registry);
        let refresher = tokio::spawn(async move { looping.run_refresh_loop(shutdown_rx).await });

        // Every reissue after these expiries is refused once
        for _ in 0..3 {
            transport.fail_next_expressions(1);
            transport.expire_all();
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(transport.pending_count(), 1);
        }
        transport.publish(versioned(&basename, 9));
        assert_eq!(log.sorted(), vec![v(9)]);

        shutdown_tx.send(true).unwrap();
        refresher.await.unwrap();
    }
}
