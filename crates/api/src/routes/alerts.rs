use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Alert log routes, merged into `/api/v1`.
///
/// ```text
/// GET    /alerts               -> list_alerts
/// DELETE /alerts/{alert_id}    -> reset_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/{alert_id}", delete(alerts::reset_alert))
}
