use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::SubscriptionManager;

/// Interval between heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn a task that pings every subscriber periodically so dead peers
/// surface as receive errors. Aborted during shutdown.
pub fn start_heartbeat(subscriptions: Arc<SubscriptionManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            interval.tick().await;
            let count = subscriptions.subscription_count().await;
            tracing::trace!(count, "Push-channel heartbeat ping");
            subscriptions.ping_all().await;
        }
    })
}
