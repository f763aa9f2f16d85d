//! Raw Postgres access for the approval engine (spec §3 data model).

use chrono::{DateTime, Utc};
use ledgerflow_domain::amount::Qirat;
use ledgerflow_domain::approvals::{
    DeployEnv, DeploymentRecord, DeploymentStatus, EntityType, MultiSigStatus, MultiSigVote,
    PendingMultiSigTransaction, SignatoryRule,
};
use ledgerflow_domain::tenant::TenantId;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{ApprovalError, Result};

pub struct ApprovalStore {
    pool: PgPool,
}

impl ApprovalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn active_rules_for(
        &self,
        tenant_id: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Vec<SignatoryRule>> {
        let rows = sqlx::query(
            r#"
            select * from signatory_rules
            where tenant_id = $1 and entity_type = $2 and entity_id = $3 and is_active
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(entity_type.as_db_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_rule).collect()
    }

    pub async fn insert_pending_transaction(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
        transaction_type: &str,
        from_entity_id: Option<&str>,
        to_entity_id: Option<&str>,
        amount: Qirat,
        fee: Qirat,
        purpose: Option<&str>,
        category: Option<&str>,
        external_ref: Option<&str>,
        required_approvals: i32,
        initiated_by: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PendingMultiSigTransaction> {
        let row = sqlx::query(
            r#"
            insert into pending_multisig_transactions
                (tenant_id, entity_type, entity_id, transaction_type, from_entity_id,
                 to_entity_id, amount, fee, purpose, category, external_ref,
                 required_approvals, current_approvals, status, initiated_by, expires_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0, 'PENDING', $13, $14)
            returning *
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(entity_type.as_db_str())
        .bind(entity_id)
        .bind(transaction_type)
        .bind(from_entity_id)
        .bind(to_entity_id)
        .bind(amount.0.to_string())
        .bind(fee.0.to_string())
        .bind(purpose)
        .bind(category)
        .bind(external_ref)
        .bind(required_approvals)
        .bind(initiated_by)
        .bind(expires_at)
        .fetch_one(&mut **tx)
        .await?;

        row_to_pending(&row)
    }

    pub async fn get_pending_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending_tx_id: Uuid,
    ) -> Result<PendingMultiSigTransaction> {
        let row = sqlx::query("select * from pending_multisig_transactions where pending_tx_id = $1 for update")
            .bind(pending_tx_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(ApprovalError::NotFound(pending_tx_id))?;
        row_to_pending(&row)
    }

    pub async fn has_voted(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending_tx_id: Uuid,
        voter_id: &str,
    ) -> Result<bool> {
        let row = sqlx::query(
            "select 1 as present from multisig_votes where pending_tx_id = $1 and voter_id = $2",
        )
        .bind(pending_tx_id)
        .bind(voter_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.is_some())
    }

    pub async fn insert_vote(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending_tx_id: Uuid,
        voter_id: &str,
        voter_role: &str,
        approved: bool,
        remarks: Option<&str>,
    ) -> Result<MultiSigVote> {
        let row = sqlx::query(
            r#"
            insert into multisig_votes (pending_tx_id, voter_id, voter_role, approved, remarks)
            values ($1, $2, $3, $4, $5)
            returning *
            "#,
        )
        .bind(pending_tx_id)
        .bind(voter_id)
        .bind(voter_role)
        .bind(approved)
        .bind(remarks)
        .fetch_one(&mut **tx)
        .await?;

        Ok(MultiSigVote {
            vote_id: row.try_get("vote_id")?,
            pending_tx_id: row.try_get("pending_tx_id")?,
            voter_id: row.try_get("voter_id")?,
            voter_role: row.try_get("voter_role")?,
            approved: row.try_get("approved")?,
            remarks: row.try_get("remarks")?,
            voted_at: row.try_get("voted_at")?,
        })
    }

    pub async fn set_status(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending_tx_id: Uuid,
        status: MultiSigStatus,
        current_approvals: Option<i32>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update pending_multisig_transactions
            set status = $2,
                current_approvals = coalesce($3, current_approvals)
            where pending_tx_id = $1
            "#,
        )
        .bind(pending_tx_id)
        .bind(status.as_db_str())
        .bind(current_approvals)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn mark_rejected(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending_tx_id: Uuid,
        rejected_by: &str,
        reason: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update pending_multisig_transactions
            set status = 'REJECTED', rejected_by = $2, rejected_at = now(), rejection_reason = $3
            where pending_tx_id = $1
            "#,
        )
        .bind(pending_tx_id)
        .bind(rejected_by)
        .bind(reason)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn mark_executed(
        &self,
        pending_tx_id: Uuid,
        executed_tx_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update pending_multisig_transactions
            set status = 'EXECUTED', executed_at = now(), executed_tx_id = $2
            where pending_tx_id = $1
            "#,
        )
        .bind(pending_tx_id)
        .bind(executed_tx_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn cancel(&self, pending_tx_id: Uuid, requested_by: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let pending = self.get_pending_for_update(&mut tx, pending_tx_id).await?;
        if pending.initiated_by != requested_by {
            return Err(ApprovalError::NotInitiator(pending_tx_id));
        }
        if pending.status != MultiSigStatus::Pending {
            return Err(ApprovalError::NotPending(pending_tx_id));
        }
        sqlx::query("update pending_multisig_transactions set status = 'CANCELLED' where pending_tx_id = $1")
            .bind(pending_tx_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn expire_if_due(&self, pending_tx_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            update pending_multisig_transactions
            set status = 'EXPIRED'
            where pending_tx_id = $1
              and status not in ('EXECUTED', 'CANCELLED', 'EXPIRED', 'REJECTED')
              and expires_at < now()
            "#,
        )
        .bind(pending_tx_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_deployment_record(
        &self,
        service: &str,
        source_env: DeployEnv,
        target_env: DeployEnv,
        image_tag: &str,
        previous_image_tag: Option<&str>,
        reason: &str,
        requested_by: &str,
        approval_id: Option<Uuid>,
    ) -> Result<DeploymentRecord> {
        let row = sqlx::query(
            r#"
            insert into deployment_records
                (service, source_env, target_env, image_tag, previous_image_tag, reason,
                 status, requested_by, approval_id)
            values ($1, $2, $3, $4, $5, $6, 'PENDING_APPROVAL', $7, $8)
            returning *
            "#,
        )
        .bind(service)
        .bind(env_str(source_env))
        .bind(env_str(target_env))
        .bind(image_tag)
        .bind(previous_image_tag)
        .bind(reason)
        .bind(requested_by)
        .bind(approval_id)
        .fetch_one(&self.pool)
        .await?;

        row_to_deployment(&row)
    }

    pub async fn set_deployment_status(
        &self,
        deployment_id: Uuid,
        status: DeploymentStatus,
        log_line: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update deployment_records
            set status = $2, logs = array_append(logs, $3), updated_at = now()
            where deployment_id = $1
            "#,
        )
        .bind(deployment_id)
        .bind(status.as_db_str())
        .bind(log_line)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn env_str(env: DeployEnv) -> &'static str {
    match env {
        DeployEnv::Devnet => "devnet",
        DeployEnv::Testnet => "testnet",
        DeployEnv::Mainnet => "mainnet",
    }
}

fn env_from_str(s: &str) -> Result<DeployEnv> {
    match s {
        "devnet" => Ok(DeployEnv::Devnet),
        "testnet" => Ok(DeployEnv::Testnet),
        "mainnet" => Ok(DeployEnv::Mainnet),
        other => Err(ApprovalError::CorruptRow(format!("unknown deploy env: {other}"))),
    }
}

fn row_to_rule(row: &sqlx::postgres::PgRow) -> Result<SignatoryRule> {
    let entity_type: String = row.try_get("entity_type")?;
    let min_amount: Option<String> = row.try_get("min_amount")?;
    let max_amount: Option<String> = row.try_get("max_amount")?;

    Ok(SignatoryRule {
        rule_id: row.try_get("rule_id")?,
        entity_type: EntityType::from_db_str(&entity_type)
            .ok_or_else(|| ApprovalError::CorruptRow(format!("unknown entity_type: {entity_type}")))?,
        entity_id: row.try_get("entity_id")?,
        rule_order: row.try_get("rule_order")?,
        min_amount: min_amount.map(|s| Qirat::new(s.parse().unwrap_or(0))),
        max_amount: max_amount.map(|s| Qirat::new(s.parse().unwrap_or(0))),
        required_approvals: row.try_get("required_approvals")?,
        transaction_types: row.try_get("transaction_types")?,
        approver_roles: row.try_get("approver_roles")?,
        auto_execute: row.try_get("auto_execute")?,
        valid_from: row.try_get("valid_from")?,
        valid_until: row.try_get("valid_until")?,
        single_rejection_is_fatal: row.try_get("single_rejection_is_fatal")?,
        is_active: row.try_get("is_active")?,
    })
}

fn row_to_pending(row: &sqlx::postgres::PgRow) -> Result<PendingMultiSigTransaction> {
    let entity_type: String = row.try_get("entity_type")?;
    let status: String = row.try_get("status")?;
    let amount: String = row.try_get("amount")?;
    let fee: String = row.try_get("fee")?;

    Ok(PendingMultiSigTransaction {
        pending_tx_id: row.try_get("pending_tx_id")?,
        entity_type: EntityType::from_db_str(&entity_type)
            .ok_or_else(|| ApprovalError::CorruptRow(format!("unknown entity_type: {entity_type}")))?,
        entity_id: row.try_get("entity_id")?,
        transaction_type: row.try_get("transaction_type")?,
        from_entity_id: row.try_get("from_entity_id")?,
        to_entity_id: row.try_get("to_entity_id")?,
        amount: Qirat::new(amount.parse().unwrap_or(0)),
        fee: Qirat::new(fee.parse().unwrap_or(0)),
        purpose: row.try_get("purpose")?,
        category: row.try_get("category")?,
        external_ref: row.try_get("external_ref")?,
        required_approvals: row.try_get("required_approvals")?,
        current_approvals: row.try_get("current_approvals")?,
        status: MultiSigStatus::from_db_str(&status)
            .ok_or_else(|| ApprovalError::CorruptRow(format!("unknown status: {status}")))?,
        initiated_by: row.try_get("initiated_by")?,
        initiated_at: row.try_get("initiated_at")?,
        expires_at: row.try_get("expires_at")?,
        executed_at: row.try_get("executed_at")?,
        executed_tx_id: row.try_get("executed_tx_id")?,
        rejected_by: row.try_get("rejected_by")?,
        rejected_at: row.try_get("rejected_at")?,
        rejection_reason: row.try_get("rejection_reason")?,
    })
}

fn row_to_deployment(row: &sqlx::postgres::PgRow) -> Result<DeploymentRecord> {
    let source_env: String = row.try_get("source_env")?;
    let target_env: String = row.try_get("target_env")?;
    let status: String = row.try_get("status")?;

    Ok(DeploymentRecord {
        deployment_id: row.try_get("deployment_id")?,
        service: row.try_get("service")?,
        source_env: env_from_str(&source_env)?,
        target_env: env_from_str(&target_env)?,
        image_tag: row.try_get("image_tag")?,
        previous_image_tag: row.try_get("previous_image_tag")?,
        reason: row.try_get("reason")?,
        status: DeploymentStatus::from_db_str(&status)
            .ok_or_else(|| ApprovalError::CorruptRow(format!("unknown deployment status: {status}")))?,
        requested_by: row.try_get("requested_by")?,
        approval_id: row.try_get("approval_id")?,
        logs: row.try_get("logs")?,
    })
}
