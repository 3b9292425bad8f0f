//! Sensor catalog, per-sensor state, and value evolution.
//!
//! Each tick every sensor takes a bounded random-walk step. With a small
//! fixed probability the step is replaced by a spike into the lower half of
//! the sensor's valid range. Values are always clamped into range.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alert::Severity;
use crate::types::Timestamp;

/// Fraction of the valid range a spike may land in, measured from `min`.
const SPIKE_RANGE_FRACTION: f64 = 0.5;

/// Decimal places kept on emitted readings.
const READING_PRECISION: i32 = 3;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Habitat subsystem a sensor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LifeSupport,
    Radiation,
    Structural,
    Thermal,
}

impl Category {
    /// Every monitored subsystem, in display order.
    pub const ALL: [Category; 4] = [
        Category::LifeSupport,
        Category::Radiation,
        Category::Structural,
        Category::Thermal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::LifeSupport => "life_support",
            Category::Radiation => "radiation",
            Category::Structural => "structural",
            Category::Thermal => "thermal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Definitions and state
// ---------------------------------------------------------------------------

/// Static description of one sensor. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub id: String,
    /// Physical quantity type, used to look up thresholds (e.g. `co2_ppm`).
    pub quantity: String,
    pub category: Category,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    /// Value the sensor starts at when the engine is constructed.
    pub initial: f64,
}

impl SensorDefinition {
    pub fn new(
        id: impl Into<String>,
        quantity: impl Into<String>,
        category: Category,
        unit: impl Into<String>,
        (min, max): (f64, f64),
        initial: f64,
    ) -> Self {
        Self {
            id: id.into(),
            quantity: quantity.into(),
            category,
            unit: unit.into(),
            min,
            max,
            initial,
        }
    }

    pub fn range_width(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Mutable per-sensor state, owned exclusively by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    pub value: f64,
    /// Delta applied by the most recent evolution step.
    pub trend: f64,
}

impl SensorState {
    pub fn new(definition: &SensorDefinition) -> Self {
        Self {
            value: definition.clamp(definition.initial),
            trend: 0.0,
        }
    }
}

/// One timestamped measurement from one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor_id: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub quantity: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: Timestamp,
    pub location: String,
    /// Classifier result for `value`; `normal` until the engine tags it.
    #[serde(default)]
    pub severity: Severity,
}

// ---------------------------------------------------------------------------
// Evolution
// ---------------------------------------------------------------------------

/// Tuning knobs for [`evolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionParams {
    /// Half-width of the random-walk band as a fraction of the range width.
    pub variation_fraction: f64,
    /// Per-tick probability of replacing the step with a spike.
    pub anomaly_probability: f64,
}

/// Advance `state` by one tick and emit the resulting reading.
///
/// The stored value keeps full precision; the emitted value is rounded to
/// three decimals and re-clamped so it never leaves `[min, max]`.
pub fn evolve<R: Rng + ?Sized>(
    state: &mut SensorState,
    definition: &SensorDefinition,
    params: &EvolutionParams,
    rng: &mut R,
    location: &str,
    now: Timestamp,
) -> Reading {
    let width = definition.range_width();
    let previous = state.value;

    let next = if rng.random_bool(params.anomaly_probability) {
        definition.min + rng.random::<f64>() * width * SPIKE_RANGE_FRACTION
    } else {
        let step = (rng.random::<f64>() - 0.5) * 2.0 * params.variation_fraction * width;
        previous + step
    };

    state.value = definition.clamp(next);
    state.trend = state.value - previous;

    Reading {
        sensor_id: definition.id.clone(),
        category: definition.category,
        quantity: definition.quantity.clone(),
        value: definition.clamp(round_to(state.value, READING_PRECISION)),
        unit: definition.unit.clone(),
        timestamp: now,
        location: location.to_string(),
        severity: Severity::Normal,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// The six-sensor habitat catalog monitored by default.
pub fn default_catalog() -> Vec<SensorDefinition> {
    vec![
        SensorDefinition::new(
            "o2-01",
            "o2_pct",
            Category::LifeSupport,
            "%",
            (19.0, 21.0),
            20.8,
        ),
        SensorDefinition::new(
            "co2-01",
            "co2_ppm",
            Category::LifeSupport,
            "ppm",
            (400.0, 5000.0),
            450.0,
        ),
        SensorDefinition::new(
            "rad-01",
            "radiation",
            Category::Radiation,
            "μSv/h",
            (5.0, 600.0),
            12.0,
        ),
        SensorDefinition::new(
            "strain-01",
            "strain",
            Category::Structural,
            "strain",
            (0.001, 0.006),
            0.0012,
        ),
        SensorDefinition::new(
            "temp-01",
            "temperature",
            Category::Thermal,
            "°C",
            (18.0, 28.0),
            22.5,
        ),
        SensorDefinition::new(
            "pressure-01",
            "pressure",
            Category::LifeSupport,
            "kPa",
            (95.0, 105.0),
            101.3,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const PARAMS: EvolutionParams = EvolutionParams {
        variation_fraction: 0.05,
        anomaly_probability: 0.02,
    };

    #[test]
    fn readings_stay_within_range_over_many_ticks() {
        let mut rng = StdRng::seed_from_u64(7);
        let catalog = default_catalog();
        let mut states: Vec<SensorState> = catalog.iter().map(SensorState::new).collect();

        for _ in 0..5_000 {
            for (def, state) in catalog.iter().zip(states.iter_mut()) {
                let reading = evolve(state, def, &PARAMS, &mut rng, "hab_A", Utc::now());
                assert!(
                    reading.value >= def.min && reading.value <= def.max,
                    "{} out of range: {}",
                    def.id,
                    reading.value
                );
                assert!(state.value >= def.min && state.value <= def.max);
            }
        }
    }

    #[test]
    fn reading_value_is_rounded_to_three_decimals() {
        let mut rng = StdRng::seed_from_u64(1);
        let def = &default_catalog()[4];
        let mut state = SensorState::new(def);
        for _ in 0..100 {
            let reading = evolve(&mut state, def, &PARAMS, &mut rng, "hab_A", Utc::now());
            let scaled = reading.value * 1000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn step_is_bounded_by_variation_band() {
        let params = EvolutionParams {
            anomaly_probability: 0.0,
            ..PARAMS
        };
        let mut rng = StdRng::seed_from_u64(3);
        let def = &default_catalog()[1];
        let mut state = SensorState::new(def);
        state.value = 2500.0;
        let max_step = params.variation_fraction * def.range_width();
        for _ in 0..1_000 {
            let before = state.value;
            evolve(&mut state, def, &params, &mut rng, "hab_A", Utc::now());
            assert!((state.value - before).abs() <= max_step + 1e-9);
            assert!((state.trend - (state.value - before)).abs() < 1e-12);
        }
    }

    #[test]
    fn spikes_land_in_lower_half_of_range() {
        let params = EvolutionParams {
            anomaly_probability: 1.0,
            ..PARAMS
        };
        let mut rng = StdRng::seed_from_u64(11);
        let def = &default_catalog()[2];
        let mut state = SensorState::new(def);
        let midpoint = def.min + def.range_width() * 0.5;
        for _ in 0..500 {
            evolve(&mut state, def, &params, &mut rng, "hab_A", Utc::now());
            assert!(state.value >= def.min && state.value <= midpoint);
        }
    }

    #[test]
    fn initial_value_is_clamped_into_range() {
        let def = SensorDefinition::new("x", "foo", Category::Thermal, "u", (0.0, 1.0), 5.0);
        assert_eq!(SensorState::new(&def).value, 1.0);
    }

    #[test]
    fn reading_carries_definition_metadata() {
        let mut rng = StdRng::seed_from_u64(5);
        let def = &default_catalog()[0];
        let mut state = SensorState::new(def);
        let reading = evolve(&mut state, def, &PARAMS, &mut rng, "hab_B", Utc::now());
        assert_eq!(reading.sensor_id, "o2-01");
        assert_eq!(reading.quantity, "o2_pct");
        assert_eq!(reading.category, Category::LifeSupport);
        assert_eq!(reading.unit, "%");
        assert_eq!(reading.location, "hab_B");
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::LifeSupport).expect("serializes");
        assert_eq!(json, "\"life_support\"");
        assert_eq!(Category::Thermal.to_string(), "thermal");
    }
}
