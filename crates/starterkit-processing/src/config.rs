//! Configuration types for the transformation pipeline and the task bridge.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Skewness above which `Log Transformation` is applied.
pub const DEFAULT_LOG_SKEW_THRESHOLD: f64 = 0.3;

/// Skewness below which `Polynomial Transformation` is applied.
pub const DEFAULT_POWER_SKEW_THRESHOLD: f64 = -0.3;

/// Interval between two liveness checks of a background task.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the transformation pipeline.
///
/// Use [`TransformConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use starterkit_processing::config::TransformConfig;
///
/// let config = TransformConfig::builder()
///     .log_skew_threshold(0.5)
///     .drop_encoded_source(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Columns with skewness strictly above this value are log transformed.
    /// Default: 0.3
    pub log_skew_threshold: f64,

    /// Columns with skewness strictly below this value are squared.
    /// Default: -0.3
    pub power_skew_threshold: f64,

    /// Whether one-hot encoding removes the source categorical column.
    /// Default: false (the source column is kept next to its indicators)
    pub drop_encoded_source: bool,

    /// How often a pending background task is re-checked.
    /// Default: 1 second
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            log_skew_threshold: DEFAULT_LOG_SKEW_THRESHOLD,
            power_skew_threshold: DEFAULT_POWER_SKEW_THRESHOLD,
            drop_encoded_source: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TransformConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("log_skew_threshold", self.log_skew_threshold),
            ("power_skew_threshold", self.power_skew_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigValidationError::NonFiniteThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.power_skew_threshold >= self.log_skew_threshold {
            return Err(ConfigValidationError::OverlappingSkewThresholds {
                log: self.log_skew_threshold,
                power: self.power_skew_threshold,
            });
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigValidationError::ZeroPollInterval);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be finite)")]
    NonFiniteThreshold { field: String, value: f64 },

    #[error(
        "Skew thresholds overlap: power threshold {power} must be below log threshold {log}"
    )]
    OverlappingSkewThresholds { log: f64, power: f64 },

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Builder for [`TransformConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    log_skew_threshold: Option<f64>,
    power_skew_threshold: Option<f64>,
    drop_encoded_source: Option<bool>,
    poll_interval: Option<Duration>,
}

impl TransformConfigBuilder {
    /// Set the skewness above which log transformation applies.
    pub fn log_skew_threshold(mut self, threshold: f64) -> Self {
        self.log_skew_threshold = Some(threshold);
        self
    }

    /// Set the skewness below which the polynomial (square) transformation applies.
    pub fn power_skew_threshold(mut self, threshold: f64) -> Self {
        self.power_skew_threshold = Some(threshold);
        self
    }

    /// Remove the source column after one-hot encoding it.
    pub fn drop_encoded_source(mut self, drop: bool) -> Self {
        self.drop_encoded_source = Some(drop);
        self
    }

    /// Set the re-check interval used while waiting on background tasks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `TransformConfig` or an error if validation fails.
    pub fn build(self) -> Result<TransformConfig, ConfigValidationError> {
        let config = TransformConfig {
            log_skew_threshold: self
                .log_skew_threshold
                .unwrap_or(DEFAULT_LOG_SKEW_THRESHOLD),
            power_skew_threshold: self
                .power_skew_threshold
                .unwrap_or(DEFAULT_POWER_SKEW_THRESHOLD),
            drop_encoded_source: self.drop_encoded_source.unwrap_or(false),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
        };

        config.validate()?;
        Ok(config)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
