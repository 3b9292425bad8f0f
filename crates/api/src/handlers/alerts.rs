//! Handlers for the alert log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rigel_core::alert::Alert;
use rigel_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for `GET /alerts`.
const DEFAULT_LIMIT: usize = 10;

/// Upper bound for `limit`; matches the log capacity.
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/alerts?limit=N -- newest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let alerts = state.engine.lock().await.recent_alerts(limit);
    Ok(Json(DataResponse::new(alerts)))
}

/// DELETE /api/v1/alerts/{alert_id} -- same effect as a `reset_alert`
/// command.
pub async fn reset_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> AppResult<StatusCode> {
    if state.engine.lock().await.reset_alert(&alert_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Alert",
            id: alert_id,
        }
        .into())
    }
}
