//! Multi-sig / approval model (spec §3, §4.6).

use crate::amount::Qirat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Treasury,
    Account,
    Org,
}

impl EntityType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            EntityType::Treasury => "TREASURY",
            EntityType::Account => "ACCOUNT",
            EntityType::Org => "ORG",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "TREASURY" => Some(EntityType::Treasury),
            "ACCOUNT" => Some(EntityType::Account),
            "ORG" => Some(EntityType::Org),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSigStatus {
    Pending,
    Approved,
    Executed,
    Cancelled,
    Expired,
    Rejected,
}

impl MultiSigStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            MultiSigStatus::Pending => "PENDING",
            MultiSigStatus::Approved => "APPROVED",
            MultiSigStatus::Executed => "EXECUTED",
            MultiSigStatus::Cancelled => "CANCELLED",
            MultiSigStatus::Expired => "EXPIRED",
            MultiSigStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(MultiSigStatus::Pending),
            "APPROVED" => Some(MultiSigStatus::Approved),
            "EXECUTED" => Some(MultiSigStatus::Executed),
            "CANCELLED" => Some(MultiSigStatus::Cancelled),
            "EXPIRED" => Some(MultiSigStatus::Expired),
            "REJECTED" => Some(MultiSigStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MultiSigStatus::Executed
                | MultiSigStatus::Cancelled
                | MultiSigStatus::Expired
                | MultiSigStatus::Rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSigVote {
    pub vote_id: Uuid,
    pub pending_tx_id: Uuid,
    pub voter_id: String,
    pub voter_role: String,
    pub approved: bool,
    pub remarks: Option<String>,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMultiSigTransaction {
    pub pending_tx_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub transaction_type: String,
    pub from_entity_id: Option<String>,
    pub to_entity_id: Option<String>,
    pub amount: Qirat,
    pub fee: Qirat,
    pub purpose: Option<String>,
    pub category: Option<String>,
    pub external_ref: Option<String>,
    pub required_approvals: i32,
    pub current_approvals: i32,
    pub status: MultiSigStatus,
    pub initiated_by: String,
    pub initiated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub executed_tx_id: Option<String>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl PendingMultiSigTransaction {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.expires_at < now
    }

    /// Invariant (c): transition PENDING -> APPROVED iff current >= required.
    pub fn quorum_reached(&self) -> bool {
        self.current_approvals >= self.required_approvals
    }

    /// Whether quorum can still mathematically be reached given `remaining_voters`
    /// who have not yet cast a vote (used to decide whether a dissent should
    /// move the transaction to REJECTED — spec §9 Open Question 1).
    pub fn quorum_still_reachable(&self, remaining_voters: i32) -> bool {
        self.current_approvals + remaining_voters >= self.required_approvals
    }
}

/// `validFrom`/`validUntil` window + entity/type/amount filters that select a
/// [`PendingMultiSigTransaction`]'s approval policy (spec §3 `SignatoryRule`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatoryRule {
    pub rule_id: Uuid,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub rule_order: i32,
    pub min_amount: Option<Qirat>,
    pub max_amount: Option<Qirat>,
    pub required_approvals: i32,
    pub transaction_types: Vec<String>,
    pub approver_roles: Vec<String>,
    pub auto_execute: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    /// (ADDED, spec §9 Open Question 1): when true, a single rejection under
    /// this rule moves the pending transaction straight to `REJECTED` instead
    /// of waiting for quorum to become unreachable.
    pub single_rejection_is_fatal: bool,
    pub is_active: bool,
}

impl SignatoryRule {
    pub fn matches(
        &self,
        transaction_type: &str,
        amount: Qirat,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.is_active {
            return false;
        }
        if now < self.valid_from {
            return false;
        }
        if let Some(until) = self.valid_until {
            if now >= until {
                return false;
            }
        }
        let type_matches =
            self.transaction_types.is_empty() || self.transaction_types.iter().any(|t| t == transaction_type);
        if !type_matches {
            return false;
        }
        if let Some(min) = self.min_amount {
            if amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if amount > max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    PendingApproval,
    InProgress,
    HealthCheck,
    Completed,
    Failed,
    RolledBack,
}

impl DeploymentStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DeploymentStatus::PendingApproval => "PENDING_APPROVAL",
            DeploymentStatus::InProgress => "IN_PROGRESS",
            DeploymentStatus::HealthCheck => "HEALTH_CHECK",
            DeploymentStatus::Completed => "COMPLETED",
            DeploymentStatus::Failed => "FAILED",
            DeploymentStatus::RolledBack => "ROLLED_BACK",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING_APPROVAL" => Some(DeploymentStatus::PendingApproval),
            "IN_PROGRESS" => Some(DeploymentStatus::InProgress),
            "HEALTH_CHECK" => Some(DeploymentStatus::HealthCheck),
            "COMPLETED" => Some(DeploymentStatus::Completed),
            "FAILED" => Some(DeploymentStatus::Failed),
            "ROLLED_BACK" => Some(DeploymentStatus::RolledBack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployEnv {
    Devnet,
    Testnet,
    Mainnet,
}

impl DeployEnv {
    /// Promotion is constrained to `devnet -> testnet -> mainnet` (spec §3).
    pub fn next(&self) -> Option<DeployEnv> {
        match self {
            DeployEnv::Devnet => Some(DeployEnv::Testnet),
            DeployEnv::Testnet => Some(DeployEnv::Mainnet),
            DeployEnv::Mainnet => None,
        }
    }

    pub fn can_promote_to(&self, target: DeployEnv) -> bool {
        self.next() == Some(target)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployment_id: Uuid,
    pub service: String,
    pub source_env: DeployEnv,
    pub target_env: DeployEnv,
    pub image_tag: String,
    pub previous_image_tag: Option<String>,
    pub reason: String,
    pub status: DeploymentStatus,
    pub requested_by: String,
    pub approval_id: Option<Uuid>,
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_rule() -> SignatoryRule {
        SignatoryRule {
            rule_id: Uuid::nil(),
            entity_type: EntityType::Treasury,
            entity_id: "treasury-1".to_string(),
            rule_order: 1,
            min_amount: Some(Qirat::new(10_000)),
            max_amount: None,
            required_approvals: 2,
            transaction_types: vec!["TRANSFER".to_string()],
            approver_roles: vec!["TREASURER".to_string()],
            auto_execute: true,
            valid_from: Utc::now() - Duration::days(1),
            valid_until: None,
            single_rejection_is_fatal: false,
            is_active: true,
        }
    }

    #[test]
    fn rule_matches_amount_above_min() {
        let rule = base_rule();
        assert!(rule.matches("TRANSFER", Qirat::new(10_000), Utc::now()));
        assert!(!rule.matches("TRANSFER", Qirat::new(9_999), Utc::now()));
    }

    #[test]
    fn rule_empty_type_list_matches_any() {
        let mut rule = base_rule();
        rule.transaction_types.clear();
        assert!(rule.matches("ANYTHING", Qirat::new(50_000), Utc::now()));
    }

    #[test]
    fn rule_respects_validity_window() {
        let mut rule = base_rule();
        rule.valid_until = Some(Utc::now() - Duration::hours(1));
        assert!(!rule.matches("TRANSFER", Qirat::new(50_000), Utc::now()));
    }

    #[test]
    fn quorum_reached_at_threshold() {
        let pending = sample_pending(1, 2);
        assert!(!pending.quorum_reached());
        let pending = sample_pending(2, 2);
        assert!(pending.quorum_reached());
    }

    #[test]
    fn quorum_reachability_accounts_for_remaining_voters() {
        let pending = sample_pending(1, 2);
        assert!(pending.quorum_still_reachable(1));
        assert!(!pending.quorum_still_reachable(0));
    }

    #[test]
    fn deploy_env_promotion_is_linear() {
        assert!(DeployEnv::Devnet.can_promote_to(DeployEnv::Testnet));
        assert!(DeployEnv::Testnet.can_promote_to(DeployEnv::Mainnet));
        assert!(!DeployEnv::Devnet.can_promote_to(DeployEnv::Mainnet));
        assert!(DeployEnv::Mainnet.next().is_none());
    }

    fn sample_pending(current: i32, required: i32) -> PendingMultiSigTransaction {
        PendingMultiSigTransaction {
            pending_tx_id: Uuid::nil(),
            entity_type: EntityType::Treasury,
            entity_id: "treasury-1".to_string(),
            transaction_type: "TRANSFER".to_string(),
            from_entity_id: None,
            to_entity_id: None,
            amount: Qirat::new(50_000),
            fee: Qirat::ZERO,
            purpose: None,
            category: None,
            external_ref: None,
            required_approvals: required,
            current_approvals: current,
            status: MultiSigStatus::Pending,
            initiated_by: "ops-1".to_string(),
            initiated_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(72),
            executed_at: None,
            executed_tx_id: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
        }
    }
}
