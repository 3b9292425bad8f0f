//! Recommended operator actions per (category, severity).

use std::collections::HashMap;

use crate::alert::Severity;
use crate::sensors::Category;

/// Returned for any combination without a curated entry.
pub const DEFAULT_ACTIONS: [&str; 2] = ["monitor", "notify_crew"];

/// Lookup table from (category, severity) to an ordered action list.
///
/// Resolution is total: combinations with no entry (including
/// [`Severity::Normal`]) resolve to [`DEFAULT_ACTIONS`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTable {
    entries: HashMap<(Category, Severity), Vec<String>>,
    fallback: Vec<String>,
}

impl ActionTable {
    /// An empty table that resolves everything to the default list.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: to_owned(&DEFAULT_ACTIONS),
        }
    }

    /// Register the ordered actions for a combination. Empty lists are
    /// ignored so resolution never yields an empty list.
    pub fn insert(&mut self, category: Category, severity: Severity, actions: &[&str]) {
        if actions.is_empty() {
            return;
        }
        self.entries.insert((category, severity), to_owned(actions));
    }

    pub fn resolve(&self, category: Category, severity: Severity) -> &[String] {
        self.entries
            .get(&(category, severity))
            .unwrap_or(&self.fallback)
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        use Category::*;
        use Severity::*;

        let mut table = Self::empty();
        table.insert(LifeSupport, Warning, &["increase_ventilation", "monitor_closely"]);
        table.insert(
            LifeSupport,
            Critical,
            &["activate_backup_o2", "notify_crew", "initiate_emergency_protocol"],
        );
        table.insert(Radiation, Warning, &["increase_monitoring", "prepare_shelter"]);
        table.insert(Radiation, Critical, &["activate_shelter", "notify_crew", "suspend_evas"]);
        table.insert(Structural, Warning, &["run_diagnostics", "increase_monitoring"]);
        table.insert(
            Structural,
            Critical,
            &["isolate_section", "notify_crew", "initiate_repair_protocol"],
        );
        table.insert(Thermal, Warning, &["adjust_cooling", "monitor_temperatures"]);
        table.insert(
            Thermal,
            Critical,
            &["activate_backup_cooling", "notify_crew", "reduce_power_consumption"],
        );
        table
    }
}

fn to_owned(actions: &[&str]) -> Vec<String> {
    actions.iter().map(|a| (*a).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
