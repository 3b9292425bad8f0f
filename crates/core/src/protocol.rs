//! Push-channel message types.
//!
//! Every frame is a JSON object `{"type": <name>, "data": <payload>}`. The
//! types here are transport-independent; the server writes them as
//! WebSocket text frames and the console reads them back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::sensors::{Category, Reading};
use crate::thresholds::ThresholdTable;

/// Static configuration sent to a subscriber on connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub thresholds: ThresholdTable,
    pub systems: Vec<Category>,
}

/// Snapshot delivered once, before any live frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitPayload {
    pub config: ChannelConfig,
    #[serde(rename = "recentAlerts")]
    pub recent_alerts: Vec<Alert>,
}

/// Reply to an inbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Name of the command being acknowledged.
    pub command: String,
    /// Whether the command changed engine state.
    pub applied: bool,
}

/// Server-to-subscriber frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Init(InitPayload),
    Telemetry(Vec<Reading>),
    Alert(Alert),
    Ack(CommandAck),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Init(_) => "init",
            ServerMessage::Telemetry(_) => "telemetry",
            ServerMessage::Alert(_) => "alert",
            ServerMessage::Ack(_) => "ack",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Operator commands carried by an inbound `command` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Remove an alert from the log.
    ResetAlert {
        #[serde(rename = "alertId")]
        alert_id: String,
    },
    /// Reserved for threshold mutation; acknowledged without effect.
    AdjustThreshold {
        quantity: Option<String>,
        warning: Option<f64>,
        critical: Option<f64>,
    },
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::ResetAlert { .. } => "reset_alert",
            ClientCommand::AdjustThreshold { .. } => "adjust_threshold",
        }
    }
}

/// Subscriber-to-server frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Command(ClientCommand),
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Lifecycle of one subscription: `Subscribed -> Streaming -> Disconnected | Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Registered; the init snapshot is queued.
    Subscribed,
    /// Receiving live frames.
    Streaming,
    /// Ended cleanly; no further deliveries.
    Disconnected,
    /// Ended by a transport error; no further deliveries.
    Error,
}

impl SubscriptionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubscriptionState::Disconnected | SubscriptionState::Error)
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionState::Subscribed => "subscribed",
            SubscriptionState::Streaming => "streaming",
            SubscriptionState::Disconnected => "disconnected",
            SubscriptionState::Error => "error",
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::alert::Severity;
    use crate::thresholds::default_thresholds;

    #[test]
    fn init_frame_shape() {
        let msg = ServerMessage::Init(InitPayload {
            config: ChannelConfig {
                thresholds: default_thresholds(),
                systems: Category::ALL.to_vec(),
            },
            recent_alerts: vec![],
        });
        let json: serde_json::Value =
            serde_json::from_str(&msg.to_json().expect("serializes")).expect("valid json");
        assert_eq!(json["type"], "init");
        assert_eq!(json["data"]["config"]["systems"][0], "life_support");
        assert_eq!(json["data"]["config"]["thresholds"]["o2_pct"]["critical"], 18.0);
        assert!(json["data"]["recentAlerts"].is_array());
    }

    #[test]
    fn telemetry_frame_carries_reading_list() {
        let msg = ServerMessage::Telemetry(vec![Reading {
            sensor_id: "temp-01".into(),
            category: Category::Thermal,
            quantity: "temperature".into(),
            value: 22.5,
            unit: "°C".into(),
            timestamp: Utc::now(),
            location: "hab_A".into(),
            severity: Severity::Normal,
        }]);
        let json: serde_json::Value =
            serde_json::from_str(&msg.to_json().expect("serializes")).expect("valid json");
        assert_eq!(json["type"], "telemetry");
        assert_eq!(json["data"][0]["sensor_id"], "temp-01");
        assert_eq!(json["data"][0]["type"], "temperature");
        assert_eq!(json["data"][0]["severity"], "normal");
        assert_eq!(msg.kind(), "telemetry");
    }

    #[test]
    fn parses_reset_alert_command() {
        let raw = r#"{"type":"command","data":{"type":"reset_alert","alertId":"alert-1"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("parses");
        assert_matches!(
            msg,
            ClientMessage::Command(ClientCommand::ResetAlert { alert_id }) if alert_id == "alert-1"
        );
    }

    #[test]
    fn parses_adjust_threshold_with_missing_fields() {
        let raw = r#"{"type":"command","data":{"type":"adjust_threshold"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("parses");
        let ClientMessage::Command(cmd) = msg;
        assert_eq!(cmd.name(), "adjust_threshold");
    }

    #[test]
    fn rejects_unknown_command() {
        let raw = r#"{"type":"command","data":{"type":"self_destruct"}}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(!SubscriptionState::Subscribed.is_terminal());
        assert!(!SubscriptionState::Streaming.is_terminal());
        assert!(SubscriptionState::Disconnected.is_terminal());
        assert!(SubscriptionState::Error.is_terminal());
    }
}
