//! Explicit engine configuration.
//!
//! [`EngineConfig::default`] reproduces the single-habitat deployment; tests
//! and alternative deployments build their own and run
//! [`EngineConfig::validate`] (called by `Engine::new`).

use std::collections::HashSet;
use std::time::Duration;

use crate::actions::ActionTable;
use crate::error::CoreError;
use crate::sensors::{default_catalog, EvolutionParams, SensorDefinition};
use crate::thresholds::{default_thresholds, ThresholdTable};

/// Window inside which a repeat alert for the same sensor and severity is
/// suppressed.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(30);

/// Maximum number of alerts retained in the log.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Per-tick spike probability for each sensor.
pub const DEFAULT_ANOMALY_PROBABILITY: f64 = 0.02;

/// Random-walk half-width as a fraction of each sensor's range.
pub const DEFAULT_VARIATION_FRACTION: f64 = 0.05;

/// Location label stamped on every reading.
pub const DEFAULT_LOCATION: &str = "hab_A";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sensors: Vec<SensorDefinition>,
    pub thresholds: ThresholdTable,
    pub actions: ActionTable,
    pub dedup_window: Duration,
    pub log_capacity: usize,
    pub anomaly_probability: f64,
    pub variation_fraction: f64,
    pub location: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensors: default_catalog(),
            thresholds: default_thresholds(),
            actions: ActionTable::default(),
            dedup_window: DEFAULT_DEDUP_WINDOW,
            log_capacity: DEFAULT_LOG_CAPACITY,
            anomaly_probability: DEFAULT_ANOMALY_PROBABILITY,
            variation_fraction: DEFAULT_VARIATION_FRACTION,
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Override the location label.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn evolution_params(&self) -> EvolutionParams {
        EvolutionParams {
            variation_fraction: self.variation_fraction,
            anomaly_probability: self.anomaly_probability,
        }
    }

    /// Reject configurations the engine cannot run safely.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sensors.is_empty() {
            return Err(CoreError::Validation(
                "sensor catalog must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if !seen.insert(sensor.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate sensor id '{}'",
                    sensor.id
                )));
            }
            if !(sensor.min.is_finite() && sensor.max.is_finite()) || sensor.min >= sensor.max {
                return Err(CoreError::Validation(format!(
                    "sensor '{}' has an invalid range [{}, {}]",
                    sensor.id, sensor.min, sensor.max
                )));
            }
            if !(sensor.min..=sensor.max).contains(&sensor.initial) {
                return Err(CoreError::Validation(format!(
                    "sensor '{}' initial value {} lies outside [{}, {}]",
                    sensor.id, sensor.initial, sensor.min, sensor.max
                )));
            }
        }

        self.thresholds.validate()?;

        if self.log_capacity == 0 {
            return Err(CoreError::Validation(
                "alert log capacity must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(CoreError::Validation(format!(
                "anomaly probability {} must be within [0, 1]",
                self.anomaly_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.variation_fraction) {
            return Err(CoreError::Validation(format!(
                "variation fraction {} must be within [0, 1]",
                self.variation_fraction
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::sensors::Category;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensors.len(), 6);
        assert_eq!(config.dedup_window, Duration::from_secs(30));
        assert_eq!(config.log_capacity, 100);
    }

    #[test]
    fn rejects_empty_catalog() {
        let config = EngineConfig {
            sensors: vec![],
            ..EngineConfig::default()
        };
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut config = EngineConfig::default();
        let copy = config.sensors[0].clone();
        config.sensors.push(copy);
        assert_matches!(
            config.validate(),
            Err(CoreError::Validation(msg)) if msg.contains("o2-01")
        );
    }

    #[test]
    fn rejects_inverted_range_and_out_of_range_initial() {
        let mut config = EngineConfig::default();
        let sensor = |range, initial| {
            SensorDefinition::new("x", "foo", Category::Thermal, "u", range, initial)
        };
        config.sensors = vec![sensor((5.0, 1.0), 2.0)];
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));

        config.sensors = vec![sensor((1.0, 5.0), 9.0)];
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_zero_capacity_and_bad_probability() {
        let config = EngineConfig {
            log_capacity: 0,
            ..EngineConfig::default()
        };
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));

        let config = EngineConfig {
            anomaly_probability: 1.5,
            ..EngineConfig::default()
        };
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));
    }
}
