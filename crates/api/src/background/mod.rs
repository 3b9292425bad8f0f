//! Background services.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown.

pub mod fanout;
pub mod ticker;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Grace period granted to each task after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Handles for the tick scheduler and the subscriber fan-out.
pub struct BackgroundTasks {
    cancel: CancellationToken,
    ticker: JoinHandle<()>,
    fanout: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Start the fan-out first so no tick output is published before a
    /// receiver exists, then the scheduler.
    pub fn spawn(state: &AppState, cancel: CancellationToken) -> Self {
        let fanout = fanout::SubscriberFanout::new(Arc::clone(&state.subscriptions));
        let fanout = tokio::spawn(fanout.run(state.event_bus.subscribe(), cancel.clone()));

        let ticker = tokio::spawn(ticker::run(
            Arc::clone(&state.engine),
            Arc::clone(&state.event_bus),
            state.config.tick_interval,
            cancel.clone(),
        ));

        Self {
            cancel,
            ticker,
            fanout,
        }
    }

    /// Cancel both tasks and wait (bounded) for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, self.ticker).await;
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, self.fanout).await;
        tracing::info!("Background services stopped");
    }
}
