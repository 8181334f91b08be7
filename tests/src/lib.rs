//! # CCN Retrieval Core Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Cross-crate flows over the in-memory transport
//! │   ├── matching.rs   # Interest factories, predicate and codec together
//! │   └── versioning.rs # Registry, fan-out and concurrent publishers
//! │
//! └── properties/       # Property tests for the matching predicate
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ccn-tests
//!
//! # By category
//! cargo test -p ccn-tests integration::
//! cargo test -p ccn-tests properties::
//!
//! # With logs
//! RUST_LOG=debug cargo test -p ccn-tests -- --nocapture
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
pub mod properties;

/// Install a `RUST_LOG`-driven subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
