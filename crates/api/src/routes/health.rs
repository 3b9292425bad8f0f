use axum::{routing::get, Router};

use crate::handlers::status::status;
use crate::state::AppState;

/// Status routes, mounted at root level (not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(status))
        .route("/api/status", get(status))
}
