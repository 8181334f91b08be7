//! Versioned retrieval configuration and validation
//!
//! # Example
//!
//! ```
//! use ccn_02_versioning::domain::VersioningConfigBuilder;
//! use std::time::Duration;
//!
//! let config = VersioningConfigBuilder::new()
//!     .max_excludes_per_interest(50)
//!     .interest_lifetime(Duration::from_secs(2))
//!     .build()
//!     .expect("Valid config");
//! assert_eq!(config.max_excludes_per_interest, 50);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VersioningError;

/// Smallest exclusion partition that can still be split in two
pub const MIN_EXCLUDES_PER_INTEREST: usize = 2;

/// Versioned retrieval configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// How long an expressed Interest stays valid before it must be reissued
    pub interest_lifetime: Duration,
    /// Most versions excluded by a single Interest before its partition splits
    pub max_excludes_per_interest: usize,
    /// Components expected after the base name (version, segment, digest)
    pub additional_name_components: Option<usize>,
    /// Period of the optional refresh loop
    pub refresh_interval: Duration,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            interest_lifetime: Duration::from_secs(4),
            max_excludes_per_interest: 200,
            additional_name_components: Some(3),
            refresh_interval: Duration::from_millis(500),
        }
    }
}

impl VersioningConfig {
    pub fn validate(&self) -> Result<(), VersioningError> {
        if self.max_excludes_per_interest < MIN_EXCLUDES_PER_INTEREST {
            return Err(VersioningError::InvalidConfig(format!(
                "max_excludes_per_interest must be at least {}, got {}",
                MIN_EXCLUDES_PER_INTEREST, self.max_excludes_per_interest
            )));
        }

        if self.interest_lifetime.is_zero() {
            return Err(VersioningError::InvalidConfig(
                "interest_lifetime cannot be 0".to_string(),
            ));
        }

        if self.refresh_interval.is_zero() {
            return Err(VersioningError::InvalidConfig(
                "refresh_interval cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the exclusion limit
    pub fn with_max_excludes(mut self, max: usize) -> Self {
        self.max_excludes_per_interest = max;
        self
    }

    /// Builder-style method to set the Interest lifetime
    pub fn with_interest_lifetime(mut self, lifetime: Duration) -> Self {
        self.interest_lifetime = lifetime;
        self
    }

    /// Builder-style method to set the expected component count after the base name
    pub fn with_additional_name_components(mut self, count: Option<usize>) -> Self {
        self.additional_name_components = count;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Builder for VersioningConfig with validation
#[derive(Default)]
pub struct VersioningConfigBuilder {
    interest_lifetime: Option<Duration>,
    max_excludes_per_interest: Option<usize>,
    additional_name_components: Option<Option<usize>>,
    refresh_interval: Option<Duration>,
}

impl VersioningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interest_lifetime(mut self, lifetime: Duration) -> Self {
        self.interest_lifetime = Some(lifetime);
        self
    }

    /// Set the exclusion limit (at least 2)
    pub fn max_excludes_per_interest(mut self, max: usize) -> Self {
        self.max_excludes_per_interest = Some(max);
        self
    }

    /// Set the component count after the base name; `None` leaves it unconstrained
    pub fn additional_name_components(mut self, count: Option<usize>) -> Self {
        self.additional_name_components = Some(count);
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Build the config, validating all parameters
    pub fn build(self) -> Result<VersioningConfig, VersioningError> {
        let defaults = VersioningConfig::default();

        let config = VersioningConfig {
            interest_lifetime: self.interest_lifetime.unwrap_or(defaults.interest_lifetime),
            max_excludes_per_interest: self
                .max_excludes_per_interest
                .unwrap_or(defaults.max_excludes_per_interest),
            additional_name_components: self
                .additional_name_components
                .unwrap_or(defaults.additional_name_components),
            refresh_interval: self.refresh_interval.unwrap_or(defaults.refresh_interval),
        };

        config.validate()?;
        Ok(config)
    }
}
