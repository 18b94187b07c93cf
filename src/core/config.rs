/// Immutable session settings threaded through the sampler and the refresh loop

use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::MonitorError;
use crate::utils::{
    DEFAULT_INTERVAL_INCREMENT_SECS, DEFAULT_SCALE, DEFAULT_UNIT_LABEL, DEFAULT_WAIT_SLICE_MS,
    MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};

/// Rate scaling and loop tunables
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Divisor applied to bits/sec (1e6 for Mbps)
    pub scale: f64,
    /// Label shown next to scaled rates
    pub unit_label: String,
    /// Amount the refresh interval grows when a cycle overruns it
    pub interval_increment: Duration,
    /// Granularity of the wait phase
    pub wait_slice: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            unit_label: DEFAULT_UNIT_LABEL.to_string(),
            interval_increment: Duration::from_secs_f64(DEFAULT_INTERVAL_INCREMENT_SECS),
            wait_slice: Duration::from_millis(DEFAULT_WAIT_SLICE_MS),
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MonitorError::Config(format!("scale must be positive, got {}", self.scale)));
        }
        if self.interval_increment.is_zero() {
            return Err(MonitorError::Config("interval increment must be positive".to_string()));
        }
        if self.wait_slice.is_zero() {
            return Err(MonitorError::Config("wait slice must be positive".to_string()));
        }
        Ok(())
    }
}

/// Options chosen on the command line for one monitoring session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub interval: Duration,
    pub include_error_columns: bool,
    pub log_destination: Option<PathBuf>,
}

impl SessionConfig {
    /// Build a session config, enforcing the accepted interval range in whole seconds
    pub fn new(
        interval_secs: u64,
        include_error_columns: bool,
        log_destination: Option<PathBuf>,
    ) -> Result<Self, MonitorError> {
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval_secs) {
            return Err(MonitorError::Config(format!(
                "interval must be between {} and {} seconds, got {}",
                MIN_INTERVAL_SECS, MAX_INTERVAL_SECS, interval_secs
            )));
        }

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            include_error_columns,
            log_destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_interval_bounds() {
        assert!(SessionConfig::new(5, false, None).is_ok());
        assert!(SessionConfig::new(3600, false, None).is_ok());
        assert!(SessionConfig::new(4, false, None).is_err());
        assert!(SessionConfig::new(3601, false, None).is_err());
    }

    #[test]
    fn test_default_sampling_config() {
        let config = SamplingConfig::default();
        assert_eq!(config.scale, 1_000_000.0);
        assert_eq!(config.unit_label, "Mbps");
        assert_eq!(config.interval_increment, Duration::from_secs(2));
        assert_eq!(config.wait_slice, Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sampling_config_rejects_zero_scale() {
        let config = SamplingConfig {
            scale: 0.0,
            ..SamplingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
