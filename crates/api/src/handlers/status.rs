use axum::Json;
use chrono::Utc;
use rigel_core::sensors::Category;
use rigel_core::types::Timestamp;
use serde::Serialize;

/// Status payload served at `/health` and `/api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub time: Timestamp,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub systems: Vec<Category>,
}

/// GET /health, GET /api/status
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        time: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        systems: Category::ALL.to_vec(),
    })
}
