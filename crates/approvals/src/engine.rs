//! Orchestrates rule selection, vote semantics, cancellation and the
//! deployment-promotion workflow specialisation (spec §4.6).

use chrono::{DateTime, Utc};
use ledgerflow_domain::amount::Qirat;
use ledgerflow_domain::approvals::{
    DeployEnv, DeploymentRecord, DeploymentStatus, EntityType, MultiSigStatus,
    PendingMultiSigTransaction,
};
use ledgerflow_domain::command::{CommandPayload, CommandType};
use ledgerflow_domain::outbox::NewOutboxCommand;
use ledgerflow_domain::tenant::TenantId;
use ledgerflow_outbox::OutboxStore;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApprovalError, Result};
use crate::rules::select_rule;
use crate::store::ApprovalStore;

/// Either the action ran immediately (no rule matched) or it now awaits
/// quorum as a pending transaction.
pub enum InitiateOutcome {
    ExecutedImmediately,
    AwaitingApproval(PendingMultiSigTransaction),
}

pub struct ApprovalEngine {
    store: ApprovalStore,
    outbox: OutboxStore,
    pool: PgPool,
}

impl ApprovalEngine {
    pub fn new(pool: PgPool) -> Self {
        Self {
            store: ApprovalStore::new(pool.clone()),
            outbox: OutboxStore::new(pool.clone()),
            pool,
        }
    }

    /// Spec §4.6 "Rule selection": picks the lowest-order matching active
    /// rule and either executes immediately (writing straight to the
    /// outbox) or opens a pending transaction awaiting quorum.
    #[allow(clippy::too_many_arguments)]
    pub async fn initiate(
        &self,
        tenant_id: &TenantId,
        entity_type: EntityType,
        entity_id: &str,
        transaction_type: &str,
        from_entity_id: Option<&str>,
        to_entity_id: Option<&str>,
        amount: Qirat,
        fee: Qirat,
        purpose: Option<&str>,
        initiated_by: &str,
        service: &str,
        command_type: CommandType,
        payload: CommandPayload,
        expiry_window: chrono::Duration,
    ) -> Result<InitiateOutcome> {
        let rules = self
            .store
            .active_rules_for(tenant_id, entity_type, entity_id)
            .await?;
        let rule = select_rule(&rules, transaction_type, amount, Utc::now());

        let Some(rule) = rule else {
            self.write_outbox_command(tenant_id, service, command_type, &payload)
                .await?;
            return Ok(InitiateOutcome::ExecutedImmediately);
        };

        let mut tx = self.pool.begin().await?;
        let pending = self
            .store
            .insert_pending_transaction(
                &mut tx,
                tenant_id,
                entity_type,
                entity_id,
                transaction_type,
                from_entity_id,
                to_entity_id,
                amount,
                fee,
                purpose,
                None,
                None,
                rule.required_approvals,
                initiated_by,
                Utc::now() + expiry_window,
            )
            .await?;
        tx.commit().await?;

        info!(
            pending_tx_id = %pending.pending_tx_id,
            required = rule.required_approvals,
            "opened pending multi-sig transaction"
        );
        Ok(InitiateOutcome::AwaitingApproval(pending))
    }

    /// Spec §4.6 "Vote semantics". Returns the post-vote pending row.
    pub async fn vote(
        &self,
        pending_tx_id: Uuid,
        voter_id: &str,
        voter_role: &str,
        approved: bool,
        remarks: Option<&str>,
        rule_single_rejection_is_fatal: bool,
        service: &str,
        command_type: CommandType,
        payload: CommandPayload,
    ) -> Result<PendingMultiSigTransaction> {
        self.store.expire_if_due(pending_tx_id).await?;

        let mut tx = self.pool.begin().await?;
        let pending = self.store.get_pending_for_update(&mut tx, pending_tx_id).await?;

        if pending.status != MultiSigStatus::Pending {
            return Err(ApprovalError::NotPending(pending_tx_id));
        }
        if pending.is_expired(Utc::now()) {
            self.store
                .set_status(&mut tx, pending_tx_id, MultiSigStatus::Expired, None)
                .await?;
            tx.commit().await?;
            return Err(ApprovalError::NotPending(pending_tx_id));
        }
        if self.store.has_voted(&mut tx, pending_tx_id, voter_id).await? {
            return Err(ApprovalError::DuplicateVote {
                pending_tx_id,
                voter_id: voter_id.to_string(),
            });
        }

        self.store
            .insert_vote(&mut tx, pending_tx_id, voter_id, voter_role, approved, remarks)
            .await?;

        let mut updated = pending.clone();
        if approved {
            updated.current_approvals += 1;
            if updated.quorum_reached() {
                updated.status = MultiSigStatus::Approved;
                self.store
                    .set_status(
                        &mut tx,
                        pending_tx_id,
                        MultiSigStatus::Approved,
                        Some(updated.current_approvals),
                    )
                    .await?;
            } else {
                self.store
                    .set_status(
                        &mut tx,
                        pending_tx_id,
                        MultiSigStatus::Pending,
                        Some(updated.current_approvals),
                    )
                    .await?;
            }
        } else if rule_single_rejection_is_fatal {
            updated.status = MultiSigStatus::Rejected;
            self.store
                .mark_rejected(&mut tx, pending_tx_id, voter_id, remarks.unwrap_or("rejected"))
                .await?;
        } else if !updated.quorum_still_reachable(0) {
            // No more unseen voters is a caller-supplied concern; absent that
            // information here, a dissent alone never forces REJECTED unless
            // the rule says single rejection is fatal (spec §9 decision).
            warn!(
                pending_tx_id = %pending_tx_id,
                "dissenting vote recorded without forcing a status transition"
            );
        }

        if updated.status == MultiSigStatus::Approved {
            self.write_outbox_command_tx(&mut tx, &updated, service, command_type, &payload)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel(&self, pending_tx_id: Uuid, requested_by: &str) -> Result<()> {
        self.store.cancel(pending_tx_id, requested_by).await
    }

    pub async fn mark_executed(&self, pending_tx_id: Uuid, executed_tx_id: &str) -> Result<()> {
        self.store.mark_executed(pending_tx_id, executed_tx_id).await
    }

    /// Spec §4.6 "Deployment workflow specialisation". Always requires
    /// approval: creates both the `DeploymentRecord` and its pending
    /// transaction atomically.
    #[allow(clippy::too_many_arguments)]
    pub async fn initiate_deployment(
        &self,
        tenant_id: &TenantId,
        service: &str,
        source_env: DeployEnv,
        target_env: DeployEnv,
        image_tag: &str,
        previous_image_tag: Option<&str>,
        reason: &str,
        requested_by: &str,
        required_approvals: i32,
        expiry_window: chrono::Duration,
    ) -> Result<(DeploymentRecord, PendingMultiSigTransaction)> {
        if !source_env.can_promote_to(target_env) {
            return Err(ApprovalError::CorruptRow(
                "deployment promotion must follow devnet -> testnet -> mainnet".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let pending = self
            .store
            .insert_pending_transaction(
                &mut tx,
                tenant_id,
                EntityType::Org,
                service,
                "DEPLOYMENT_PROMOTION",
                None,
                None,
                Qirat::ZERO,
                Qirat::ZERO,
                Some(reason),
                None,
                None,
                required_approvals,
                requested_by,
                Utc::now() + expiry_window,
            )
            .await?;
        tx.commit().await?;

        let deployment = self
            .store
            .insert_deployment_record(
                service,
                source_env,
                target_env,
                image_tag,
                previous_image_tag,
                reason,
                requested_by,
                Some(pending.pending_tx_id),
            )
            .await?;

        Ok((deployment, pending))
    }

    /// Drives `IN_PROGRESS -> HEALTH_CHECK -> COMPLETED|FAILED|ROLLED_BACK`.
    /// A failed health check rolls back to `previous_image_tag`.
    pub async fn advance_deployment(
        &self,
        deployment: &DeploymentRecord,
        health_check_passed: bool,
    ) -> Result<DeploymentStatus> {
        match deployment.status {
            DeploymentStatus::PendingApproval => {
                self.store
                    .set_deployment_status(deployment.deployment_id, DeploymentStatus::InProgress, "promotion started")
                    .await?;
                Ok(DeploymentStatus::InProgress)
            }
            DeploymentStatus::InProgress => {
                self.store
                    .set_deployment_status(deployment.deployment_id, DeploymentStatus::HealthCheck, "running health check")
                    .await?;
                Ok(DeploymentStatus::HealthCheck)
            }
            DeploymentStatus::HealthCheck if health_check_passed => {
                self.store
                    .set_deployment_status(deployment.deployment_id, DeploymentStatus::Completed, "health check passed")
                    .await?;
                Ok(DeploymentStatus::Completed)
            }
            DeploymentStatus::HealthCheck => {
                self.store
                    .set_deployment_status(
                        deployment.deployment_id,
                        DeploymentStatus::RolledBack,
                        "health check failed, rolled back to previous image",
                    )
                    .await?;
                Ok(DeploymentStatus::RolledBack)
            }
            terminal => Ok(terminal),
        }
    }

    async fn write_outbox_command(
        &self,
        tenant_id: &TenantId,
        service: &str,
        command_type: CommandType,
        payload: &CommandPayload,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.write_outbox_command_inner(&mut tx, tenant_id, service, command_type, payload)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn write_outbox_command_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        pending: &PendingMultiSigTransaction,
        service: &str,
        command_type: CommandType,
        payload: &CommandPayload,
    ) -> Result<()> {
        self.write_outbox_command_inner(tx, &TenantId::default(), service, command_type, payload)
            .await?;
        info!(pending_tx_id = %pending.pending_tx_id, "quorum reached, outbox command written");
        Ok(())
    }

    async fn write_outbox_command_inner(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: &TenantId,
        service: &str,
        command_type: CommandType,
        payload: &CommandPayload,
    ) -> Result<()> {
        let new_cmd = NewOutboxCommand {
            tenant_id: tenant_id.clone(),
            service: service.to_string(),
            command_type,
            request_id: Uuid::new_v4().to_string(),
            payload: payload.to_json(),
        };
        self.outbox.enqueue(tx, new_cmd).await?;
        Ok(())
    }
}
