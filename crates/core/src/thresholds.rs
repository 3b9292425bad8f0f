//! Threshold classifier for sensor readings.
//!
//! Each quantity type has its own table with a warning and a critical
//! boundary and an explicit danger direction. Quantities with no table
//! classify as [`Severity::Normal`]; an unmodeled sensor never alerts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::alert::Severity;
use crate::error::CoreError;

/// Which side of a boundary is dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Dangerous when the value falls to or below the boundary.
    Low,
    /// Dangerous when the value rises to or above the boundary.
    High,
}

/// Warning and critical boundaries for a single quantity type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
    pub direction: Direction,
}

impl Threshold {
    /// Boundaries for a quantity that is dangerous when low.
    pub fn low(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::Low,
        }
    }

    /// Boundaries for a quantity that is dangerous when high.
    pub fn high(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::High,
        }
    }

    /// Classify `value`, testing the critical boundary first.
    pub fn classify(&self, value: f64) -> Severity {
        if self.breaches(self.critical, value) {
            Severity::Critical
        } else if self.breaches(self.warning, value) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    fn breaches(&self, boundary: f64, value: f64) -> bool {
        match self.direction {
            Direction::Low => value <= boundary,
            Direction::High => value >= boundary,
        }
    }

    /// The critical boundary must lie at or beyond the warning boundary in
    /// the dangerous direction.
    fn validate(&self, quantity: &str) -> Result<(), CoreError> {
        if !self.warning.is_finite() || !self.critical.is_finite() {
            return Err(CoreError::Validation(format!(
                "threshold for '{quantity}' must have finite boundaries"
            )));
        }
        let ordered = match self.direction {
            Direction::Low => self.critical <= self.warning,
            Direction::High => self.critical >= self.warning,
        };
        if !ordered {
            return Err(CoreError::Validation(format!(
                "threshold for '{quantity}': critical {} is not beyond warning {}",
                self.critical, self.warning
            )));
        }
        Ok(())
    }
}

/// Per-quantity threshold tables keyed by quantity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    entries: BTreeMap<String, Threshold>,
}

impl ThresholdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the table for `quantity`.
    pub fn insert(&mut self, quantity: impl Into<String>, threshold: Threshold) {
        self.entries.insert(quantity.into(), threshold);
    }

    pub fn with(mut self, quantity: impl Into<String>, threshold: Threshold) -> Self {
        self.insert(quantity, threshold);
        self
    }

    pub fn get(&self, quantity: &str) -> Option<&Threshold> {
        self.entries.get(quantity)
    }

    /// Classify a value for `quantity`. Unknown quantities are normal.
    pub fn classify(&self, quantity: &str, value: f64) -> Severity {
        self.get(quantity)
            .map_or(Severity::Normal, |t| t.classify(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Threshold)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.iter().try_for_each(|(q, t)| t.validate(q))
    }
}

/// Habitat thresholds for the default catalog.
pub fn default_thresholds() -> ThresholdTable {
    ThresholdTable::new()
        .with("o2_pct", Threshold::low(19.5, 18.0))
        .with("co2_ppm", Threshold::high(1000.0, 5000.0))
        .with("radiation", Threshold::high(50.0, 500.0))
        .with("strain", Threshold::high(0.002, 0.005))
        .with("temperature", Threshold::high(26.0, 28.0))
        .with("pressure", Threshold::low(97.0, 95.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
