//! Where received frames go.

use std::fmt;

use rigel_core::alert::Severity;
use rigel_core::protocol::ServerMessage;
use tokio::sync::mpsc;

use crate::history::AlertHistory;

/// Which source is currently feeding the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Frames come from the server's push channel.
    Live,
    /// Frames come from a local engine.
    Fallback,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkMode::Live => "live",
            LinkMode::Fallback => "fallback",
        })
    }
}

/// Consumer of push-channel frames, fed identically by the live link and
/// by the local fallback engine.
pub trait FrameSink: Send {
    fn deliver(&mut self, frame: ServerMessage);

    /// Called when the frame source switches.
    fn mode_changed(&mut self, _mode: LinkMode) {}
}

impl FrameSink for mpsc::UnboundedSender<ServerMessage> {
    fn deliver(&mut self, frame: ServerMessage) {
        let _ = self.send(frame);
    }
}

/// Logs every frame and records alerts in the history.
pub struct ConsoleSink {
    history: AlertHistory,
    mode: Option<LinkMode>,
}

impl ConsoleSink {
    pub fn new(history: AlertHistory) -> Self {
        Self {
            history,
            mode: None,
        }
    }

    pub fn history(&self) -> &AlertHistory {
        &self.history
    }

    pub fn mode(&self) -> Option<LinkMode> {
        self.mode
    }
}

impl FrameSink for ConsoleSink {
    fn deliver(&mut self, frame: ServerMessage) {
        match frame {
            ServerMessage::Init(init) => {
                tracing::info!(
                    systems = init.config.systems.len(),
                    thresholds = init.config.thresholds.len(),
                    recent_alerts = init.recent_alerts.len(),
                    "Received initial configuration"
                );
            }
            ServerMessage::Telemetry(readings) => {
                for r in &readings {
                    tracing::debug!(
                        sensor_id = %r.sensor_id,
                        quantity = %r.quantity,
                        value = r.value,
                        unit = %r.unit,
                        severity = %r.severity,
                        "Telemetry"
                    );
                }
            }
            ServerMessage::Alert(alert) => {
                match alert.severity {
                    Severity::Critical => tracing::error!(
                        alert_id = %alert.alert_id,
                        actions = ?alert.actions,
                        "{}", alert.message
                    ),
                    _ => tracing::warn!(
                        alert_id = %alert.alert_id,
                        actions = ?alert.actions,
                        "{}", alert.message
                    ),
                }
                self.history.record(alert);
            }
            ServerMessage::Ack(ack) => {
                tracing::info!(
                    command = %ack.command,
                    applied = ack.applied,
                    "Command acknowledged"
                );
            }
        }
    }

    fn mode_changed(&mut self, mode: LinkMode) {
        match mode {
            LinkMode::Live => tracing::info!("Connected to Rigel server"),
            LinkMode::Fallback => tracing::warn!("Running in local simulation mode"),
        }
        self.mode = Some(mode);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
