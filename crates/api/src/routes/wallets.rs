//! Read-model wallet lookup (spec §3 `Wallet`, §4.7).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use ledgerflow_domain::readmodel::Wallet;
use ledgerflow_domain::tenant::TenantId;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<String>,
) -> Result<Json<Wallet>> {
    let wallet = state
        .read_model
        .get_wallet(&TenantId::default(), &wallet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("wallet {wallet_id}")))?;
    Ok(Json(wallet))
}
