//! Local `/health` and `/metrics` endpoints (spec §4.4 "Observables").
//! Plain JSON, matching the teacher's own `routes/health.rs` idiom — this
//! pack has no real metrics-scraping crate to reach for, so a Prometheus
//! exposition format would be fabricated rather than grounded.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use ledgerflow_gateway::CircuitState;

use crate::identity::IdentityPool;
use crate::worker::Metrics;

pub struct ServerState {
    pub metrics: Arc<Metrics>,
    pub identities: Arc<IdentityPool>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    identities: Vec<IdentityHealth>,
}

#[derive(Serialize)]
struct IdentityHealth {
    identity: &'static str,
    state: &'static str,
    failure_rate: f64,
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let identities: Vec<IdentityHealth> = state
        .identities
        .breaker_snapshot()
        .into_iter()
        .map(|(identity, stats)| {
            let total = stats.successes + stats.failures;
            IdentityHealth {
                identity,
                state: match stats.state {
                    CircuitState::Closed => "CLOSED",
                    CircuitState::Open => "OPEN",
                    CircuitState::HalfOpen => "HALF_OPEN",
                },
                failure_rate: if total == 0 {
                    0.0
                } else {
                    stats.failures as f64 / total as f64
                },
            }
        })
        .collect();

    let status = if identities.iter().any(|i| i.state == "OPEN") {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse { status, identities })
}

#[derive(Serialize)]
struct MetricsResponse {
    processed_committed: u64,
    processed_failed: u64,
    queue_depth: i64,
    shutting_down: bool,
}

async fn metrics(State(state): State<Arc<ServerState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        processed_committed: state.metrics.processed_committed.load(Ordering::Relaxed),
        processed_failed: state.metrics.processed_failed.load(Ordering::Relaxed),
        queue_depth: state.metrics.queue_depth.load(Ordering::Relaxed),
        shutting_down: state.metrics.shutting_down.load(Ordering::Relaxed),
    })
}
