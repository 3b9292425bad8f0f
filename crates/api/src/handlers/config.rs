use axum::extract::State;
use axum::Json;
use rigel_core::protocol::ChannelConfig;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/config -- threshold table and monitored categories.
pub async fn get_config(State(state): State<AppState>) -> Json<DataResponse<ChannelConfig>> {
    let config = state.engine.lock().await.channel_config();
    Json(DataResponse::new(config))
}
