//! Local simulation used when the push channel is unavailable.
//!
//! Drives its own [`Engine`] (independent randomness, independent dedup
//! state) and delivers the same frames the server would.

use std::time::Duration;

use chrono::Utc;
use rigel_core::config::EngineConfig;
use rigel_core::engine::Engine;
use rigel_core::error::CoreError;
use rigel_core::protocol::ServerMessage;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::sink::FrameSink;

/// Alerts included in the local `init` snapshot.
const RECENT_ALERTS_ON_INIT: usize = 10;

pub struct Fallback {
    engine: Engine,
    tick_interval: Duration,
}

impl Fallback {
    pub fn new(config: EngineConfig, tick_interval: Duration) -> Result<Self, CoreError> {
        Ok(Self::with_engine(Engine::new(config)?, tick_interval))
    }

    pub fn with_engine(engine: Engine, tick_interval: Duration) -> Self {
        Self {
            engine,
            tick_interval,
        }
    }

    /// Deliver a local `init` snapshot, then tick until `cancel` fires.
    /// Returns the engine so callers can inspect its final state.
    pub async fn run<S: FrameSink>(mut self, sink: &mut S, cancel: CancellationToken) -> Engine {
        sink.deliver(ServerMessage::Init(
            self.engine.init_snapshot(RECENT_ALERTS_ON_INIT),
        ));

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(ticks = self.engine.ticks(), "Local simulation stopping");
                    break;
                }
                _ = interval.tick() => {
                    let output = self.engine.tick(Utc::now());
                    sink.deliver(ServerMessage::Telemetry(output.readings));
                    for alert in output.alerts {
                        sink.deliver(ServerMessage::Alert(alert));
                    }
                }
            }
        }

        self.engine
    }
}
