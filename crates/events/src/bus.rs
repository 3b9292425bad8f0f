//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans engine output out to any number of consumers. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use rigel_core::alert::Alert;
use rigel_core::engine::TickOutput;
use rigel_core::protocol::ServerMessage;
use rigel_core::sensors::Reading;

// ---------------------------------------------------------------------------
// EngineEvent
// ---------------------------------------------------------------------------

/// What the engine produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEventKind {
    /// All readings from one tick.
    Telemetry { readings: Vec<Reading> },
    /// One newly created (non-suppressed) alert.
    Alert { alert: Alert },
}

/// One unit of engine output published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// Engine tick that produced this event.
    pub tick: u64,

    #[serde(flatten)]
    pub kind: EngineEventKind,

    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl EngineEvent {
    pub fn telemetry(tick: u64, readings: Vec<Reading>) -> Self {
        Self {
            tick,
            kind: EngineEventKind::Telemetry { readings },
            timestamp: Utc::now(),
        }
    }

    pub fn alert(tick: u64, alert: Alert) -> Self {
        Self {
            tick,
            kind: EngineEventKind::Alert { alert },
            timestamp: Utc::now(),
        }
    }

    /// Split a tick's output into its telemetry event followed by one event
    /// per new alert.
    pub fn from_tick(tick: u64, output: TickOutput) -> Vec<Self> {
        let mut events = Vec::with_capacity(1 + output.alerts.len());
        events.push(Self::telemetry(tick, output.readings));
        events.extend(output.alerts.into_iter().map(|a| Self::alert(tick, a)));
        events
    }

    /// The push-channel frame subscribers receive for this event.
    pub fn to_message(&self) -> ServerMessage {
        match &self.kind {
            EngineEventKind::Telemetry { readings } => ServerMessage::Telemetry(readings.clone()),
            EngineEventKind::Alert { alert } => ServerMessage::Alert(alert.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`EngineEvent`].
///
/// # Usage
///
/// ```rust
/// use rigel_events::bus::{EngineEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EngineEvent::telemetry(1, vec![]));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers the event was delivered to; zero
    /// receivers is not an error.
    pub fn publish(&self, event: EngineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
