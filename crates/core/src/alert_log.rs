//! Bounded alert log and the time-windowed deduplicator in front of it.
//!
//! The deduplicator suppresses a new alert when an alert for the same
//! sensor, quantity and severity was raised inside the dedup window. This
//! keeps oscillating values that repeatedly cross a boundary from flooding
//! subscribers.

use std::collections::VecDeque;

use chrono::TimeDelta;

use crate::actions::ActionTable;
use crate::alert::{Alert, Severity};
use crate::sensors::Reading;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// AlertLog
// ---------------------------------------------------------------------------

/// Ring buffer of alerts, newest first. The oldest entry is evicted once
/// `capacity` is reached.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend `alert`, evicting from the tail to stay within capacity.
    pub fn push_front(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(self.capacity);
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Clone the newest `n` alerts.
    pub fn recent(&self, n: usize) -> Vec<Alert> {
        self.entries.iter().take(n).cloned().collect()
    }

    /// Remove the alert with `alert_id`, if present.
    pub fn remove(&mut self, alert_id: &str) -> Option<Alert> {
        let index = self.entries.iter().position(|a| a.alert_id == alert_id)?;
        self.entries.remove(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// AlertDeduplicator
// ---------------------------------------------------------------------------

/// Decides whether a classified reading raises a new alert.
#[derive(Debug, Clone)]
pub struct AlertDeduplicator {
    window: TimeDelta,
    log: AlertLog,
}

impl AlertDeduplicator {
    pub fn new(window: TimeDelta, capacity: usize) -> Self {
        Self {
            window,
            log: AlertLog::new(capacity),
        }
    }

    /// Consider a reading classified at `severity`.
    ///
    /// Returns the newly created alert, or `None` when the severity is
    /// normal or an equivalent alert is still inside the window. Suppression
    /// leaves the log untouched.
    pub fn consider(
        &mut self,
        reading: &Reading,
        severity: Severity,
        actions: &ActionTable,
        now: Timestamp,
    ) -> Option<Alert> {
        if !severity.is_alerting() {
            return None;
        }

        if let Some(existing) = self.find_recent(reading, severity, now) {
            tracing::debug!(
                sensor_id = %reading.sensor_id,
                %severity,
                existing = %existing.alert_id,
                "Alert suppressed inside dedup window"
            );
            return None;
        }

        let alert = Alert::from_reading(
            reading,
            severity,
            actions.resolve(reading.category, severity).to_vec(),
            now,
        );
        tracing::info!(
            alert_id = %alert.alert_id,
            sensor_id = %reading.sensor_id,
            %severity,
            value = reading.value,
            "Alert raised"
        );
        self.log.push_front(alert.clone());
        Some(alert)
    }

    fn find_recent(&self, reading: &Reading, severity: Severity, now: Timestamp) -> Option<&Alert> {
        self.log.iter().find(|alert| {
            alert.severity == severity
                && alert.quantity == reading.quantity
                && alert.references(&reading.sensor_id)
                && now.signed_duration_since(alert.timestamp) < self.window
        })
    }

    pub fn log(&self) -> &AlertLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut AlertLog {
        &mut self.log
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::sensors::Category;

    fn reading(sensor_id: &str, quantity: &str, value: f64) -> Reading {
        Reading {
            sensor_id: sensor_id.into(),
            category: Category::LifeSupport,
            quantity: quantity.into(),
            value,
            unit: "%".into(),
            timestamp: Utc::now(),
            location: "hab_A".into(),
            severity: Severity::Normal,
        }
    }

    fn dedup() -> AlertDeduplicator {
        AlertDeduplicator::new(TimeDelta::seconds(30), 100)
    }

    /// Feed one o2 reading at `severity` through `d` with the default actions.
    fn feed(
        d: &mut AlertDeduplicator,
        sensor_id: &str,
        severity: Severity,
        at: Timestamp,
    ) -> Option<Alert> {
        let r = reading(sensor_id, "o2_pct", 17.8);
        d.consider(&r, severity, &ActionTable::default(), at)
    }

    #[test]
    fn normal_severity_never_alerts() {
        let mut d = dedup();
        assert!(feed(&mut d, "o2-01", Severity::Normal, Utc::now()).is_none());
        assert!(d.log().is_empty());
    }

    #[test]
    fn critical_o2_creates_alert_with_backup_o2_action() {
        let mut d = dedup();
        let alert = feed(&mut d, "o2-01", Severity::Critical, Utc::now()).expect("alert created");
        assert_eq!(alert.category, Category::LifeSupport);
        assert_eq!(alert.severity, Severity::Critical);
        assert!(alert.actions.iter().any(|a| a == "activate_backup_o2"));
        assert_eq!(d.log().iter().next().map(|a| &a.alert_id), Some(&alert.alert_id));
    }

    #[test]
    fn repeat_inside_window_is_suppressed() {
        let mut d = dedup();
        let t0 = Utc::now();
        assert!(feed(&mut d, "o2-01", Severity::Critical, t0).is_some());
        let t1 = t0 + TimeDelta::seconds(5);
        assert!(feed(&mut d, "o2-01", Severity::Critical, t1).is_none());
        assert_eq!(d.log().len(), 1);
    }

    #[test]
    fn repeat_after_window_creates_second_alert() {
        let mut d = dedup();
        let t0 = Utc::now();
        feed(&mut d, "o2-01", Severity::Critical, t0);
        let t1 = t0 + TimeDelta::seconds(31);
        assert!(feed(&mut d, "o2-01", Severity::Critical, t1).is_some());
        assert_eq!(d.log().len(), 2);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let mut d = dedup();
        let t0 = Utc::now();
        feed(&mut d, "o2-01", Severity::Critical, t0);
        let t1 = t0 + TimeDelta::seconds(30);
        assert!(feed(&mut d, "o2-01", Severity::Critical, t1).is_some());
    }

    #[test]
    fn different_severity_or_sensor_is_not_deduplicated() {
        let mut d = dedup();
        let actions = ActionTable::default();
        let now = Utc::now();
        assert!(feed(&mut d, "o2-01", Severity::Critical, now).is_some());
        assert!(feed(&mut d, "o2-01", Severity::Warning, now).is_some());
        assert!(feed(&mut d, "o2-02", Severity::Critical, now).is_some());
        let other_quantity = reading("o2-01", "o2_partial", 17.8);
        assert!(d.consider(&other_quantity, Severity::Critical, &actions, now).is_some());
        assert_eq!(d.log().len(), 4);
    }

    #[test]
    fn log_is_bounded_and_newest_first() {
        let mut d = dedup();
        let now = Utc::now();
        let mut ids = Vec::new();
        for i in 0..150 {
            let alert = feed(&mut d, &format!("s-{i}"), Severity::Critical, now)
                .expect("distinct sensors always alert");
            ids.push(alert.alert_id);
        }
        assert_eq!(d.log().capacity(), 100);
        assert_eq!(d.log().len(), 100);
        let logged: Vec<&String> = d.log().iter().map(|a| &a.alert_id).collect();
        let expected: Vec<&String> = ids.iter().rev().take(100).collect();
        assert_eq!(logged, expected);
    }

    #[test]
    fn small_log_evicts_oldest_at_capacity() {
        let mut log = AlertLog::new(2);
        let now = Utc::now();
        let mut alerts = Vec::new();
        for id in ["a", "b", "c"] {
            let r = reading(id, "o2_pct", 1.0);
            let alert = Alert::from_reading(&r, Severity::Warning, vec![], now);
            log.push_front(alert.clone());
            alerts.push(alert);
        }
        assert_eq!(log.capacity(), 2);
        assert_eq!(log.len(), log.capacity());
        assert_eq!(log.recent(5), vec![alerts[2].clone(), alerts[1].clone()]);
    }

    #[test]
    fn remove_deletes_only_matching_entry() {
        let mut log = AlertLog::new(10);
        let now = Utc::now();
        let a = Alert::from_reading(&reading("a", "o2_pct", 1.0), Severity::Warning, vec![], now);
        let b = Alert::from_reading(&reading("b", "o2_pct", 1.0), Severity::Warning, vec![], now);
        log.push_front(a.clone());
        log.push_front(b.clone());

        assert!(log.remove("missing").is_none());
        assert_eq!(log.remove(&a.alert_id).map(|x| x.alert_id), Some(a.alert_id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(10)[0].alert_id, b.alert_id);
    }

    #[test]
    fn reset_alert_reopens_dedup_window() {
        let mut d = dedup();
        let now = Utc::now();
        let first = feed(&mut d, "o2-01", Severity::Critical, now).expect("first alert");
        d.log_mut().remove(&first.alert_id);
        assert!(feed(&mut d, "o2-01", Severity::Critical, now).is_some());
    }
}
