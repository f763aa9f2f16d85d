//! API routes

pub mod approvals;
pub mod health;
pub mod outbox;
pub mod transactions;
pub mod wallets;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Creates the main API router (spec §4.2/§6 external interfaces). Only the
/// read-model surface and the vote wrapper are exposed here; the rest of
/// the read model's mutation paths go through the outbox, not HTTP.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/api/v1/wallets/:wallet_id", get(wallets::get_wallet))
        .route("/api/v1/transactions/:tx_id", get(transactions::get_transaction))
        .route("/api/v1/outbox/:command_id", get(outbox::get_command))
        .route("/api/v1/approvals/:pending_tx_id/vote", post(approvals::vote))
        .with_state(state)
}
