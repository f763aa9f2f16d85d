//! Thin HTTP wrapper over [`ledgerflow_approvals::ApprovalEngine`] (spec
//! §4.6 "Vote semantics"). Routing/auth proper stays out of scope (spec
//! §1 Non-goals); this only translates the request body into the engine
//! call and serialises the resulting row.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ledgerflow_domain::command::{CommandPayload, CommandType};

use crate::error::{ApiError, Result};
use crate::models::VoteRequest;
use crate::state::AppState;

pub async fn vote(
    State(state): State<Arc<AppState>>,
    Path(pending_tx_id): Path<Uuid>,
    Json(body): Json<VoteRequest>,
) -> Result<Json<serde_json::Value>> {
    let command_type = CommandType::from_wire_str(&body.command_type)
        .ok_or_else(|| ApiError::UnknownCommandType(body.command_type.clone()))?;
    let payload = CommandPayload::from_json(command_type, &body.payload)
        .map_err(|e| ApiError::MalformedCommand(e.to_string()))?;

    let updated = state
        .approvals
        .vote(
            pending_tx_id,
            &body.voter_id,
            &body.voter_role,
            body.approved,
            body.remarks.as_deref(),
            body.single_rejection_is_fatal,
            &body.service,
            command_type,
            payload,
        )
        .await?;

    Ok(Json(serde_json::to_value(updated).expect("PendingMultiSigTransaction always serializes")))
}
