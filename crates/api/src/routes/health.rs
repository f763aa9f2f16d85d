//! Liveness and readiness endpoints (spec §4.2: "/health"/"/ready").

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::models::{HealthResponse, ReadyResponse};
use crate::state::AppState;

/// Liveness: the process is up and serving requests. Never touches the
/// database or the gateway, so it can't be dragged down by either being slow.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy",
        version: state.version.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    }))
}

/// Readiness: checks the database is reachable and at least one gateway
/// identity's circuit breaker isn't tripped (spec §4.2 "readiness checks
/// DB + at least one gateway identity not OPEN").
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>> {
    sqlx::query("select 1").execute(&state.pool).await?;

    let breaker = state.gateway.circuit_breaker_stats();
    let gateway_identity = match breaker.state {
        ledgerflow_gateway::CircuitState::Open => "OPEN",
        ledgerflow_gateway::CircuitState::HalfOpen => "HALF_OPEN",
        ledgerflow_gateway::CircuitState::Closed => "CLOSED",
    };

    Ok(Json(ReadyResponse {
        status: if breaker.state == ledgerflow_gateway::CircuitState::Open {
            "degraded"
        } else {
            "ready"
        },
        database: "reachable",
        gateway_identity,
    }))
}
