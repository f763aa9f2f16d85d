//! Outbox row shape (C3). See [`crate::command`] for the typed payload that
//! replaces the "dynamic `any` payload" pattern the source used.

use crate::command::CommandType;
use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    Pending,
    Locked,
    Committed,
    Failed,
}

impl OutboxStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Locked => "LOCKED",
            OutboxStatus::Committed => "COMMITTED",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OutboxStatus::Pending),
            "LOCKED" => Some(OutboxStatus::Locked),
            "COMMITTED" => Some(OutboxStatus::Committed),
            "FAILED" => Some(OutboxStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// A row a producer wants enqueued, in the same local transaction as the
/// business-state mutation that caused it (spec §4.3 "Enqueue contract").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOutboxCommand {
    pub tenant_id: TenantId,
    pub service: String,
    pub command_type: CommandType,
    pub request_id: String,
    pub payload: serde_json::Value,
}

/// A persisted outbox row (spec §3 `OutboxCommand`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxCommand {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub service: String,
    pub command_type: CommandType,
    pub request_id: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub locked_by: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub fabric_tx_id: Option<String>,
    pub commit_block: Option<i64>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxCommand {
    /// Invariant (a): a `LOCKED` row always has both `locked_by` and `locked_at` set.
    pub fn lock_invariant_holds(&self) -> bool {
        match self.status {
            OutboxStatus::Locked => self.locked_by.is_some() && self.locked_at.is_some(),
            _ => true,
        }
    }

    /// Invariant (c): `FAILED` with `attempts >= max_retries` is terminal (dead-letter).
    pub fn is_dead_lettered(&self, max_retries: i32) -> bool {
        self.status == OutboxStatus::Failed && self.attempts >= max_retries
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct OutboxTunables {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: i64,
}

fn default_poll_interval_ms() -> u64 {
    100
}
fn default_batch_size() -> i64 {
    10
}
fn default_max_retries() -> i32 {
    5
}
fn default_lock_timeout_secs() -> i64 {
    300
}

impl Default for OutboxTunables {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_string() {
        for s in [
            OutboxStatus::Pending,
            OutboxStatus::Locked,
            OutboxStatus::Committed,
            OutboxStatus::Failed,
        ] {
            assert_eq!(OutboxStatus::from_db_str(s.as_db_str()), Some(s));
        }
    }

    #[test]
    fn lock_invariant_flags_missing_fields() {
        let mut row = sample_row();
        row.status = OutboxStatus::Locked;
        row.locked_by = None;
        assert!(!row.lock_invariant_holds());
        row.locked_by = Some("worker-1".to_string());
        row.locked_at = Some(Utc::now());
        assert!(row.lock_invariant_holds());
    }

    #[test]
    fn dead_letter_requires_failed_and_attempts_ceiling() {
        let mut row = sample_row();
        row.status = OutboxStatus::Failed;
        row.attempts = 5;
        assert!(row.is_dead_lettered(5));
        row.attempts = 4;
        assert!(!row.is_dead_lettered(5));
    }

    fn sample_row() -> OutboxCommand {
        OutboxCommand {
            id: Uuid::nil(),
            tenant_id: TenantId::default(),
            service: "wallet-service".to_string(),
            command_type: CommandType::TransferTokens,
            request_id: "req-1".to_string(),
            payload: serde_json::json!({}),
            status: OutboxStatus::Pending,
            attempts: 0,
            locked_by: None,
            locked_at: None,
            submitted_at: None,
            fabric_tx_id: None,
            commit_block: None,
            error: None,
            error_code: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
