//! Severity tiers and the alert record raised for threshold violations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sensors::{Category, Reading};
use crate::types::Timestamp;

/// Severity tier of a reading or alert.
///
/// Ordered so that `Critical > Warning > Normal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Within the safe band.
    #[default]
    Normal,
    /// Crossed the warning boundary but not the critical one.
    Warning,
    /// Crossed the critical boundary.
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Whether a reading at this tier should raise an alert.
    pub fn is_alerting(self) -> bool {
        self != Severity::Normal
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deduplicated notification for an out-of-range reading.
///
/// Alerts are never mutated after creation; the alert log owns them and
/// subscribers receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Process-unique identifier (`alert-<uuid>`).
    pub alert_id: String,
    pub severity: Severity,
    /// Habitat subsystem the triggering sensor belongs to.
    pub category: Category,
    /// Quantity type of the triggering reading (e.g. `o2_pct`).
    #[serde(rename = "type")]
    pub quantity: String,
    /// Sensors that contributed to this alert.
    pub sensor_refs: Vec<String>,
    pub message: String,
    pub timestamp: Timestamp,
    /// Recommended operator actions, in priority order.
    pub actions: Vec<String>,
}

impl Alert {
    /// Build a fresh alert for `reading` with a newly generated id.
    pub fn from_reading(
        reading: &Reading,
        severity: Severity,
        actions: Vec<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            alert_id: generate_alert_id(),
            severity,
            category: reading.category,
            quantity: reading.quantity.clone(),
            sensor_refs: vec![reading.sensor_id.clone()],
            message: format!(
                "{} {}: {} {} at {}",
                reading.quantity, severity, reading.value, reading.unit, reading.location
            ),
            timestamp: now,
            actions,
        }
    }

    /// Whether this alert was raised for `sensor_id`.
    pub fn references(&self, sensor_id: &str) -> bool {
        self.sensor_refs.iter().any(|s| s == sensor_id)
    }
}

/// Generate a collision-resistant alert identifier.
pub fn generate_alert_id() -> String {
    format!("alert-{}", uuid::Uuid::new_v4())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn o2_reading(value: f64) -> Reading {
        Reading {
            sensor_id: "o2-01".into(),
            category: Category::LifeSupport,
            quantity: "o2_pct".into(),
            value,
            unit: "%".into(),
            timestamp: Utc::now(),
            location: "hab_A".into(),
            severity: Severity::Normal,
        }
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Normal);
        assert!(!Severity::Normal.is_alerting());
        assert!(Severity::Warning.is_alerting());
    }

    #[test]
    fn message_includes_type_severity_value_unit_and_location() {
        let alert = Alert::from_reading(
            &o2_reading(17.8),
            Severity::Critical,
            vec!["activate_backup_o2".into()],
            Utc::now(),
        );
        assert_eq!(alert.message, "o2_pct critical: 17.8 % at hab_A");
        assert_eq!(alert.sensor_refs, vec!["o2-01".to_string()]);
        assert!(alert.references("o2-01"));
        assert!(!alert.references("co2-01"));
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_alert_id();
        let b = generate_alert_id();
        assert_ne!(a, b);
        assert!(a.starts_with("alert-"));
    }

    #[test]
    fn serializes_with_wire_names() {
        let alert = Alert::from_reading(&o2_reading(18.5), Severity::Warning, vec![], Utc::now());
        let json = serde_json::to_value(&alert).expect("alert serializes");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["category"], "life_support");
        assert_eq!(json["type"], "o2_pct");
        assert_eq!(json["sensor_refs"][0], "o2-01");
    }
}
