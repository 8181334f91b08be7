//! # CCN-02 Versioning
//!
//! Continuous retrieval of every version published under a base name.
//! Listeners register for a name and are handed each new version exactly
//! once, without polling.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `VersionNumber`: 48-bit binary time, encoded as a `0xFD` component
//!   - `ExclusionPartition`: a version range and the versions seen in it
//!   - `VersioningConfig`: lifetimes and exclusion limits
//!
//! - **Ports Layer** (`ports/`):
//!   - `VersioningApi`, `ContentListener`: Driving ports
//!   - `InterestTransport`, `ContentHandler`: Driven ports
//!
//! - **Service Layer** (`service/`):
//!   - `VersioningInterestManager`: one state machine per base name
//!   - `BasenameState`: fans each new version out to listeners
//!   - `VersioningInterest`: registry of base names
//!
//! ## Invariants
//!
//! - A version is delivered to a listener at most once while it stays registered
//! - Exclusions are never truncated; full partitions split instead
//! - Nothing is delivered after a retrieval stops
//! - Map changes happen under one lock; transport calls happen outside it
//!
//! ## Usage Example
//!
//! ```ignore
//! use ccn_02_versioning::{SharedListener, VersioningInterest};
//!
//! let registry = VersioningInterest::new(transport);
//! let listener: SharedListener = Arc::new(|content: &ContentObject, _: &Interest| {
//!     println!("new version: {}", content.name());
//!     Ok(())
//! });
//! registry.express_interest(&Name::from_uri("/parc/report")?, listener)?;
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports for convenience
pub use domain::{
    ExclusionPartition, VersionNumber, VersioningConfig, VersioningConfigBuilder,
    MIN_EXCLUDES_PER_INTEREST, TICKS_PER_SECOND, VERSION_COMPONENT_LEN, VERSION_MARKER,
};
pub use error::{ListenerError, TransportError, VersionError, VersioningError};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{
    ContentHandler, ContentListener, InterestTransport, SharedListener, VersioningApi,
};
pub use service::{BasenameState, ManagerLifecycle, VersioningInterest, VersioningInterestManager};
