//! Applies a decoded [`KnownEvent`] to the read model and advances the
//! checkpoint inside a single local transaction, so the projection write
//! and the checkpoint advance commit atomically (spec §4.5 "Per-event
//! processing" step 3).

use ledgerflow_db::readmodel::tx as rm;
use ledgerflow_db::{CheckpointStore, DbError};
use ledgerflow_domain::amount::Qirat;
use ledgerflow_domain::readmodel::{NotificationChannel, OnchainStatus, UserStatus};
use ledgerflow_domain::tenant::TenantId;
use ledgerflow_gateway::LedgerEvent;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::schema::KnownEvent;

pub async fn apply(
    pool: &PgPool,
    checkpoints: &CheckpointStore,
    projector_name: &str,
    tenant_id: &TenantId,
    event: &LedgerEvent,
    known: &KnownEvent,
) -> Result<()> {
    let mut transaction = pool.begin().await.map_err(DbError::from)?;

    rm::insert_event_log(
        &mut transaction,
        tenant_id,
        Uuid::new_v4(),
        &event.event_name,
        event.block_number,
        Some(&event.tx_id),
        &event.payload,
    )
    .await?;

    match known {
        KnownEvent::UserCreated { profile_id, account_id, country_code } => {
            rm::upsert_user(
                &mut transaction,
                tenant_id,
                profile_id,
                account_id,
                country_code,
                UserStatus::Active,
                OnchainStatus::Active,
            )
            .await?;
        }
        KnownEvent::WalletCreated { wallet_id, profile_id } => {
            rm::create_wallet_if_missing(&mut transaction, tenant_id, wallet_id, profile_id).await?;
        }
        KnownEvent::TransferEvent { from, to, amount, fee, from_balance, to_balance }
        | KnownEvent::TransferWithFeesCompleted { from, to, amount, fee, from_balance, to_balance } => {
            rm::insert_transaction(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                &event.event_name,
                Some(from),
                Some(to),
                *amount,
                *fee,
                Some(&event.tx_id),
                Some(event.block_number),
            )
            .await?;
            rm::set_wallet_balance(&mut transaction, tenant_id, from, *from_balance).await?;
            rm::set_wallet_balance(&mut transaction, tenant_id, to, *to_balance).await?;
        }
        KnownEvent::VelocityTaxApplied { account_id, tax_amount, balance } => {
            rm::insert_transaction(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "VELOCITY_TAX",
                Some(account_id),
                None,
                *tax_amount,
                Qirat::ZERO,
                Some(&event.tx_id),
                Some(event.block_number),
            )
            .await?;
            rm::set_wallet_balance(&mut transaction, tenant_id, account_id, *balance).await?;
        }
        KnownEvent::TreasuryAllocationEvent { treasury_account_id, amount, balance } => {
            rm::insert_transaction(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "TREASURY_ALLOCATION",
                None,
                Some(treasury_account_id),
                *amount,
                Qirat::ZERO,
                Some(&event.tx_id),
                Some(event.block_number),
            )
            .await?;
            rm::set_wallet_balance(&mut transaction, tenant_id, treasury_account_id, *balance).await?;
        }
        KnownEvent::SystemPaused { reason } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "system",
                NotificationChannel::InApp,
                "SYSTEM_PAUSED",
                reason,
            )
            .await?;
        }
        KnownEvent::SystemResumed { reason } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "system",
                NotificationChannel::InApp,
                "SYSTEM_RESUMED",
                reason,
            )
            .await?;
        }
        KnownEvent::OrgTxExecuted { org_id, pending_tx_id } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                org_id,
                NotificationChannel::InApp,
                "ORG_TX_EXECUTED",
                &format!("multi-sig transaction {pending_tx_id} executed"),
            )
            .await?;
        }
        KnownEvent::ProposalSubmitted { proposal_id } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "governance",
                NotificationChannel::InApp,
                "PROPOSAL_SUBMITTED",
                proposal_id,
            )
            .await?;
        }
        KnownEvent::ProposalExecuted { proposal_id } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "governance",
                NotificationChannel::InApp,
                "PROPOSAL_EXECUTED",
                proposal_id,
            )
            .await?;
        }
        KnownEvent::LoanApproved { loan_id } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                "loans",
                NotificationChannel::InApp,
                "LOAN_APPROVED",
                loan_id,
            )
            .await?;
        }
        KnownEvent::OrganizationActivated { org_id } => {
            rm::insert_notification(
                &mut transaction,
                tenant_id,
                Uuid::new_v4(),
                org_id,
                NotificationChannel::InApp,
                "ORGANIZATION_ACTIVATED",
                &format!("organization {org_id} activated"),
            )
            .await?;
        }
    }

    checkpoints
        .advance(&mut transaction, projector_name, event.block_number, &event.tx_id)
        .await?;

    transaction.commit().await.map_err(DbError::from)?;
    Ok(())
}
