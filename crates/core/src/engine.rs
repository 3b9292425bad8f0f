//! The telemetry engine: one explicit instance owns sensor state and the
//! alert log.
//!
//! Both the authoritative server and the offline console construct an
//! [`Engine`] from an [`EngineConfig`]; they differ only in how they deliver
//! the [`TickOutput`]. The engine is not internally synchronised. Callers
//! that share it across tasks serialise access behind a single lock.

use chrono::TimeDelta;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::alert::Alert;
use crate::alert_log::AlertDeduplicator;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::protocol::{ChannelConfig, ClientCommand, CommandAck, InitPayload};
use crate::sensors::{evolve, Category, Reading, SensorState};
use crate::types::Timestamp;

/// Everything one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    /// One reading per sensor, in catalog order.
    pub readings: Vec<Reading>,
    /// Alerts created this tick (suppressed repeats excluded).
    pub alerts: Vec<Alert>,
}

#[derive(Debug)]
pub struct Engine<R = StdRng> {
    config: EngineConfig,
    states: Vec<SensorState>,
    dedup: AlertDeduplicator,
    rng: R,
    ticks: u64,
}

impl Engine<StdRng> {
    /// Build an engine seeded from the operating system.
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Build an engine with a fixed seed, for reproducible runs.
    pub fn seeded(config: EngineConfig, seed: u64) -> Result<Self, CoreError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self, CoreError> {
        config.validate()?;
        let window = TimeDelta::from_std(config.dedup_window).map_err(|_| {
            CoreError::Validation(format!(
                "dedup window {:?} is out of range",
                config.dedup_window
            ))
        })?;
        let states = config.sensors.iter().map(SensorState::new).collect();
        let dedup = AlertDeduplicator::new(window, config.log_capacity);
        Ok(Self {
            config,
            states,
            dedup,
            rng,
            ticks: 0,
        })
    }

    /// Run one evolution + classification + dedup pass over every sensor.
    pub fn tick(&mut self, now: Timestamp) -> TickOutput {
        let params = self.config.evolution_params();
        let mut output = TickOutput {
            readings: Vec::with_capacity(self.states.len()),
            alerts: Vec::new(),
        };

        let thresholds = &self.config.thresholds;
        let actions = &self.config.actions;
        for (definition, state) in self.config.sensors.iter().zip(self.states.iter_mut()) {
            let mut reading = evolve(
                state,
                definition,
                &params,
                &mut self.rng,
                &self.config.location,
                now,
            );
            let severity = thresholds.classify(&reading.quantity, reading.value);
            reading.severity = severity;
            if let Some(alert) = self.dedup.consider(&reading, severity, actions, now) {
                output.alerts.push(alert);
            }
            output.readings.push(reading);
        }

        self.ticks += 1;
        output
    }

    /// Classify and deduplicate a reading produced outside the engine.
    pub fn ingest(&mut self, reading: &Reading, now: Timestamp) -> Option<Alert> {
        let config = &self.config;
        let severity = config.thresholds.classify(&reading.quantity, reading.value);
        self.dedup.consider(reading, severity, &config.actions, now)
    }

    /// Static configuration plus the newest `recent` alerts.
    pub fn init_snapshot(&self, recent: usize) -> InitPayload {
        InitPayload {
            config: self.channel_config(),
            recent_alerts: self.recent_alerts(recent),
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            thresholds: self.config.thresholds.clone(),
            systems: Category::ALL.to_vec(),
        }
    }

    pub fn recent_alerts(&self, n: usize) -> Vec<Alert> {
        self.dedup.log().recent(n)
    }

    pub fn alert_count(&self) -> usize {
        self.dedup.log().len()
    }

    /// Remove an alert from the log. Returns whether one was removed.
    pub fn reset_alert(&mut self, alert_id: &str) -> bool {
        let removed = self.dedup.log_mut().remove(alert_id).is_some();
        if removed {
            tracing::info!(alert_id, "Alert reset");
        } else {
            tracing::debug!(alert_id, "Reset requested for unknown alert");
        }
        removed
    }

    /// Apply an operator command and produce its acknowledgement.
    pub fn apply_command(&mut self, command: &ClientCommand) -> CommandAck {
        let applied = match command {
            ClientCommand::ResetAlert { alert_id } => self.reset_alert(alert_id),
            ClientCommand::AdjustThreshold { quantity, .. } => {
                tracing::info!(
                    quantity = ?quantity,
                    "Threshold adjustment is not supported; ignoring"
                );
                false
            }
        };
        CommandAck {
            command: command.name().to_string(),
            applied,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current sensor states, in catalog order.
    pub fn states(&self) -> &[SensorState] {
        &self.states
    }

    /// Number of ticks run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
