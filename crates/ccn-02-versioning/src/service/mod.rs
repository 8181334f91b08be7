//! Service layer: per-name managers, fan-out and the registry

pub mod basename;
pub mod manager;
pub mod registry;

pub use basename::BasenameState;
pub use manager::{ManagerLifecycle, VersioningInterestManager};
pub use registry::VersioningInterest;
