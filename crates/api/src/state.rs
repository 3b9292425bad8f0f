use std::sync::Arc;

use rigel_core::engine::Engine;
use rigel_core::error::CoreError;
use rigel_events::EventBus;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::ws::SubscriptionManager;

/// The process-wide engine. The mutex is the single execution queue: every
/// tick, snapshot and command runs under it, one at a time.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Authoritative telemetry engine.
    pub engine: SharedEngine,
    /// Push-channel subscribers.
    pub subscriptions: Arc<SubscriptionManager>,
    /// Carries tick output from the scheduler to the subscriber fan-out.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Build the state for `config`, constructing a fresh engine.
    pub fn new(config: ServerConfig) -> Result<Self, CoreError> {
        let engine = Engine::new(config.engine_config())?;
        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(Mutex::new(engine)),
            subscriptions: Arc::new(SubscriptionManager::new()),
            event_bus: Arc::new(EventBus::default()),
        })
    }
}
