//! Response/request DTOs for the HTTP boundary. Read-model rows
//! (`UserProfile`, `Wallet`, `Transaction`, `PendingMultiSigTransaction`,
//! `OutboxCommand`) already derive `Serialize` in `ledgerflow-domain`, so
//! handlers return those directly; everything this crate needs beyond that
//! lives inline below — there is no `models/` submodule tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub gateway_identity: &'static str,
}

/// Body for `POST /api/v1/approvals/:pendingTxId/vote`. The outbox command
/// that quorum ultimately releases isn't recoverable from the pending
/// transaction row alone (spec §3 `PendingMultiSigTransaction` carries no
/// command payload), so the caller replays the same command it originally
/// submitted for initiation.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub voter_id: String,
    pub voter_role: String,
    pub approved: bool,
    pub remarks: Option<String>,
    #[serde(default)]
    pub single_rejection_is_fatal: bool,
    pub service: String,
    pub command_type: String,
    pub payload: serde_json::Value,
}
