//! Plain-JSON `/health` endpoint, matching the teacher's own idiom.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use ledgerflow_db::CheckpointStore;
use serde::Serialize;

pub struct ServerState {
    pub checkpoints: CheckpointStore,
    pub projector_name: String,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    projector_name: String,
    last_processed_block: i64,
}

async fn health(State(state): State<Arc<ServerState>>) -> axum::Json<HealthResponse> {
    let last_processed_block = state
        .checkpoints
        .load(&state.projector_name)
        .await
        .map(|s| s.last_processed_block)
        .unwrap_or(-1);

    axum::Json(HealthResponse {
        status: if last_processed_block >= 0 { "healthy" } else { "degraded" },
        projector_name: state.projector_name.clone(),
        last_processed_block,
    })
}
