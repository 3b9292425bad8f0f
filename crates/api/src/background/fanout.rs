//! Forwards engine events from the bus to push-channel subscribers.

use std::sync::Arc;

use rigel_events::EngineEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::ws::{encode, SubscriptionManager};

/// Consumes the event bus and queues each event's frame for every
/// subscriber.
pub struct SubscriberFanout {
    subscriptions: Arc<SubscriptionManager>,
}

impl SubscriberFanout {
    pub fn new(subscriptions: Arc<SubscriptionManager>) -> Self {
        Self { subscriptions }
    }

    /// Run until `cancel` fires or the bus closes.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<EngineEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Subscriber fan-out stopping");
                    break;
                }
                result = receiver.recv() => result,
            };

            match result {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Subscriber fan-out lagged, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, subscriber fan-out shutting down");
                    break;
                }
            }
        }
    }

    async fn deliver(&self, event: &EngineEvent) {
        let message = event.to_message();
        match encode(&message) {
            Ok(frame) => {
                let delivered = self.subscriptions.broadcast(event.tick, frame).await;
                tracing::trace!(
                    kind = message.kind(),
                    tick = event.tick,
                    delivered,
                    "Frame fanned out"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, kind = message.kind(), "Failed to encode frame");
            }
        }
    }
}
