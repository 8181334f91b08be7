//! Domain layer: versions, configuration and exclusion partitions

pub mod config;
pub mod partition;
pub mod version;

pub use config::{VersioningConfig, VersioningConfigBuilder, MIN_EXCLUDES_PER_INTEREST};
pub use partition::ExclusionPartition;
pub use version::{VersionNumber, TICKS_PER_SECOND, VERSION_COMPONENT_LEN, VERSION_MARKER};
