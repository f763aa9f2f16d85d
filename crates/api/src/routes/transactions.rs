//! Read-model transaction lookup (spec §3 `Transaction`, §4.7).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ledgerflow_domain::readmodel::Transaction;
use ledgerflow_domain::tenant::TenantId;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(tx_id): Path<Uuid>,
) -> Result<Json<Transaction>> {
    let transaction = state
        .read_model
        .get_transaction(&TenantId::default(), tx_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("transaction {tx_id}")))?;
    Ok(Json(transaction))
}
