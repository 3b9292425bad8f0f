pub mod alerts;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                         push channel (WebSocket)
/// /config                     GET threshold table + categories
/// /alerts                     GET recent alerts
/// /alerts/{alert_id}          DELETE reset one alert
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/config", get(handlers::config::get_config))
        .merge(alerts::router())
}
