use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use rigel_core::protocol::{ServerMessage, SubscriptionState};
use rigel_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing frames to one subscriber.
pub type SubscriberSender = mpsc::UnboundedSender<Message>;

/// Serialize a server frame into a WebSocket text message.
pub fn encode(message: &ServerMessage) -> Result<Message, serde_json::Error> {
    Ok(Message::Text(message.to_json()?.into()))
}

/// One registered push-channel subscriber.
pub struct Subscription {
    /// Outbound frame queue, drained by the connection's send task.
    pub sender: SubscriberSender,
    pub connected_at: Timestamp,
    pub state: SubscriptionState,
    /// Engine tick already reflected in this subscriber's `init` snapshot.
    /// Live frames from this tick or earlier are not delivered.
    pub snapshot_tick: u64,
}

/// Tracks every live subscription.
///
/// Each subscriber owns an unbounded queue, so a slow consumer only delays
/// itself. Thread-safe via interior `RwLock`; shared as `Arc`.
pub struct SubscriptionManager {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber whose snapshot reflects `snapshot_tick`.
    ///
    /// `init` is queued before the subscription becomes visible to
    /// [`broadcast`](Self::broadcast), so it is always the first frame the
    /// subscriber receives.
    pub async fn subscribe(
        &self,
        conn_id: String,
        init: Message,
        snapshot_tick: u64,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(init);
        let subscription = Subscription {
            sender: tx,
            connected_at: chrono::Utc::now(),
            state: SubscriptionState::Subscribed,
            snapshot_tick,
        };
        self.subscriptions.write().await.insert(conn_id.clone(), subscription);
        tracing::info!(conn_id = %conn_id, snapshot_tick, "Subscriber registered");
        rx
    }

    /// Remove a subscription, recording the state it ended in.
    ///
    /// Returns `false` if the subscription was already gone.
    pub async fn unsubscribe(&self, conn_id: &str, final_state: SubscriptionState) -> bool {
        let Some(subscription) = self.subscriptions.write().await.remove(conn_id) else {
            return false;
        };
        let connected_secs = chrono::Utc::now()
            .signed_duration_since(subscription.connected_at)
            .num_seconds();
        tracing::info!(
            conn_id = %conn_id,
            from = %subscription.state,
            to = %final_state,
            connected_secs,
            "Subscription ended"
        );
        true
    }

    /// Deliver a live frame produced by engine tick `tick` to every
    /// subscriber whose snapshot predates it.
    ///
    /// Returns the number of subscribers the frame was queued for. Closed
    /// queues are skipped; their connection task removes them.
    pub async fn broadcast(&self, tick: u64, message: Message) -> usize {
        let mut subscriptions = self.subscriptions.write().await;
        let mut delivered = 0;
        for (conn_id, subscription) in subscriptions.iter_mut() {
            if tick <= subscription.snapshot_tick {
                continue;
            }
            if subscription.sender.send(message.clone()).is_err() {
                continue;
            }
            delivered += 1;
            if subscription.state == SubscriptionState::Subscribed {
                subscription.state = SubscriptionState::Streaming;
                tracing::info!(conn_id = %conn_id, "Subscriber streaming");
            }
        }
        delivered
    }

    /// Queue a frame for a single subscriber.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        match self.subscriptions.read().await.get(conn_id) {
            Some(subscription) => subscription.sender.send(message).is_ok(),
            None => false,
        }
    }

    pub async fn state_of(&self, conn_id: &str) -> Option<SubscriptionState> {
        self.subscriptions.read().await.get(conn_id).map(|s| s.state)
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Send a Close frame to every subscriber, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut subscriptions = self.subscriptions.write().await;
        let count = subscriptions.len();
        for subscription in subscriptions.values() {
            let _ = subscription.sender.send(Message::Close(None));
        }
        subscriptions.clear();
        tracing::info!(count, "Closed all push-channel subscriptions");
    }

    /// Send a Ping frame to every subscriber.
    pub async fn ping_all(&self) {
        let subscriptions = self.subscriptions.read().await;
        for subscription in subscriptions.values() {
            let _ = subscription.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
