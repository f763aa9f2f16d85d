//! Outbox command status lookup (spec §3 `OutboxCommand`, §4.3).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ledgerflow_domain::outbox::OutboxCommand;
use ledgerflow_domain::tenant::TenantId;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub async fn get_command(
    State(state): State<Arc<AppState>>,
    Path(command_id): Path<Uuid>,
) -> Result<Json<OutboxCommand>> {
    let command = state
        .outbox
        .find_by_id(&TenantId::default(), command_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("outbox command {command_id}")))?;
    Ok(Json(command))
}
