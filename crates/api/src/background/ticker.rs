//! Tick scheduler.
//!
//! Advances the shared engine on a fixed interval and publishes each tick's
//! output on the event bus. The scheduler runs whether or not anyone is
//! subscribed, so the alert log keeps accumulating.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rigel_events::{EngineEvent, EventBus};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::SharedEngine;

/// Run the tick loop until `cancel` is triggered.
pub async fn run(
    engine: SharedEngine,
    bus: Arc<EventBus>,
    tick_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_ms = tick_interval.as_millis() as u64,
        "Tick scheduler started"
    );

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Tick scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                let events = {
                    let mut engine = engine.lock().await;
                    let output = engine.tick(Utc::now());
                    EngineEvent::from_tick(engine.ticks(), output)
                };
                let alerts = events.len().saturating_sub(1);
                let mut receivers = 0;
                for event in events {
                    receivers = bus.publish(event);
                }
                if alerts > 0 {
                    tracing::debug!(alerts, receivers, "Tick published with new alerts");
                } else {
                    tracing::trace!(receivers, "Tick published");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rigel_core::config::EngineConfig;
    use rigel_core::engine::Engine;
    use rigel_events::bus::EngineEventKind;
    use tokio::sync::Mutex;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn publishes_one_telemetry_event_per_tick() {
        let engine = Arc::new(Mutex::new(
            Engine::seeded(EngineConfig::default(), 7).expect("valid config"),
        ));
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            Arc::clone(&engine),
            Arc::clone(&bus),
            Duration::from_millis(2000),
            cancel.clone(),
        ));

        let mut telemetry_ticks = Vec::new();
        while telemetry_ticks.len() < 3 {
            let event = rx.recv().await.expect("bus stays open");
            if let EngineEventKind::Telemetry { readings } = &event.kind {
                assert_eq!(readings.len(), 6);
                telemetry_ticks.push(event.tick);
            }
        }
        assert_eq!(telemetry_ticks, vec![1, 2, 3]);

        cancel.cancel();
        handle.await.expect("scheduler exits cleanly");
        assert!(engine.lock().await.ticks() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_ticking_without_receivers() {
        let engine = Arc::new(Mutex::new(
            Engine::seeded(EngineConfig::default(), 1).expect("valid config"),
        ));
        let bus = Arc::new(EventBus::default());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            Arc::clone(&engine),
            bus,
            Duration::from_millis(100),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(450)).await;
        cancel.cancel();
        handle.await.expect("scheduler exits cleanly");

        assert!(engine.lock().await.ticks() >= 4);
    }
}
