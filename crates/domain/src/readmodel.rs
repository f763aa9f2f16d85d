//! Read-model row shapes served by the HTTP boundary (spec §3, §4.7).
//!
//! These mirror projector-written Postgres rows; they carry no business
//! logic of their own beyond the small state-machine guards below.

use crate::amount::Qirat;
use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Registered,
    Active,
    Frozen,
    Deleted,
}

impl UserStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            UserStatus::Registered => "REGISTERED",
            UserStatus::Active => "ACTIVE",
            UserStatus::Frozen => "FROZEN",
            UserStatus::Deleted => "DELETED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "REGISTERED" => Some(UserStatus::Registered),
            "ACTIVE" => Some(UserStatus::Active),
            "FROZEN" => Some(UserStatus::Frozen),
            "DELETED" => Some(UserStatus::Deleted),
            _ => None,
        }
    }

    /// Invariant: `DELETED` is terminal, never revisited.
    pub fn can_transition_to(&self, next: UserStatus) -> bool {
        match self {
            UserStatus::Deleted => false,
            UserStatus::Registered => matches!(next, UserStatus::Active | UserStatus::Deleted),
            UserStatus::Active => matches!(next, UserStatus::Frozen | UserStatus::Deleted),
            UserStatus::Frozen => matches!(next, UserStatus::Active | UserStatus::Deleted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnchainStatus {
    NotRegistered,
    Active,
    Frozen,
}

impl OnchainStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OnchainStatus::NotRegistered => "NOT_REGISTERED",
            OnchainStatus::Active => "ACTIVE",
            OnchainStatus::Frozen => "FROZEN",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "NOT_REGISTERED" => Some(OnchainStatus::NotRegistered),
            "ACTIVE" => Some(OnchainStatus::Active),
            "FROZEN" => Some(OnchainStatus::Frozen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub tenant_id: TenantId,
    pub profile_id: String,
    pub account_id: String,
    pub country_code: String,
    pub status: UserStatus,
    pub onchain_status: OnchainStatus,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub tenant_id: TenantId,
    pub wallet_id: String,
    pub profile_id: String,
    pub cached_balance: Qirat,
    pub onchain_status: OnchainStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Wallet {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub tenant_id: TenantId,
    pub tx_id: Uuid,
    pub transaction_type: String,
    pub from_wallet_id: Option<String>,
    pub to_wallet_id: Option<String>,
    pub amount: Qirat,
    pub fee: Qirat,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub external_ref: Option<String>,
    pub blockchain_tx_id: Option<String>,
    pub block_number: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
    InApp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub tenant_id: TenantId,
    pub notification_id: Uuid,
    pub profile_id: String,
    pub channel: NotificationChannel,
    pub subject: String,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    pub tenant_id: TenantId,
    pub event_id: Uuid,
    pub event_type: String,
    pub block_number: i64,
    pub tx_id: Option<String>,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_status_round_trips_through_db_string() {
        for s in [
            UserStatus::Registered,
            UserStatus::Active,
            UserStatus::Frozen,
            UserStatus::Deleted,
        ] {
            assert_eq!(UserStatus::from_db_str(s.as_db_str()), Some(s));
        }
    }

    #[test]
    fn user_status_deleted_is_terminal() {
        assert!(!UserStatus::Deleted.can_transition_to(UserStatus::Active));
        assert!(UserStatus::Active.can_transition_to(UserStatus::Frozen));
        assert!(!UserStatus::Active.can_transition_to(UserStatus::Registered));
    }

    #[test]
    fn wallet_deleted_flag_follows_timestamp() {
        let mut w = Wallet {
            tenant_id: TenantId::default(),
            wallet_id: "wallet-1".to_string(),
            profile_id: "profile-1".to_string(),
            cached_balance: Qirat::ZERO,
            onchain_status: OnchainStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        assert!(!w.is_deleted());
        w.deleted_at = Some(Utc::now());
        assert!(w.is_deleted());
    }
}
