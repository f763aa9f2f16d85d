//! Post-commit reconciliation (spec §4.4 "why it exists"): the ledger emits
//! at most one event per transaction, so a command that both creates a user
//! and distributes genesis would otherwise clobber the `UserCreated`
//! projection with `GenesisDistributed`. The submitter writes directly to
//! the read model for the commands that need it, but only while its lease
//! is still valid — callers pass `lease_still_valid` in from the outbox
//! completion result.

use ledgerflow_db::ReadModelStore;
use ledgerflow_domain::command::CommandPayload;
use ledgerflow_domain::readmodel::NotificationChannel;
use ledgerflow_domain::tenant::TenantId;
use ledgerflow_gateway::LedgerGateway;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

pub async fn reconcile(
    read_model: &ReadModelStore,
    gateway: &dyn LedgerGateway,
    tenant_id: &TenantId,
    payload: &CommandPayload,
) -> Result<()> {
    match payload {
        CommandPayload::CreateUser { user_id, .. } => reconcile_create_user(read_model, gateway, tenant_id, user_id).await,
        CommandPayload::TransferTokens { from, to, .. } => {
            reconcile_transfer(read_model, gateway, tenant_id, from, to).await
        }
        _ => Ok(()),
    }
}

async fn reconcile_create_user(
    read_model: &ReadModelStore,
    gateway: &dyn LedgerGateway,
    tenant_id: &TenantId,
    profile_id: &str,
) -> Result<()> {
    read_model.activate_user(tenant_id, profile_id).await?;
    read_model
        .create_wallet_if_missing(tenant_id, profile_id, profile_id)
        .await?;

    match gateway
        .evaluate("TokenomicsContract", "GetBalance", &[profile_id.to_string()])
        .await
    {
        Ok(balance) => match parse_balance(&balance) {
            Some(qirat) => read_model.set_wallet_balance(tenant_id, profile_id, qirat).await?,
            None => warn!(profile_id, "GetBalance returned a non-numeric balance, leaving cache stale"),
        },
        Err(e) => warn!(profile_id, error = %e, "post-commit GetBalance query failed, leaving cache stale"),
    }

    Ok(())
}

/// `GetBalance` replies `{"balance": "<decimal integer>"}`; a bare string
/// body is also accepted for gateway implementations that skip the wrapper.
fn parse_balance(value: &serde_json::Value) -> Option<ledgerflow_domain::amount::Qirat> {
    value
        .get("balance")
        .and_then(|v| v.as_str())
        .or_else(|| value.as_str())
        .and_then(|s| s.parse().ok())
}

async fn reconcile_transfer(
    read_model: &ReadModelStore,
    gateway: &dyn LedgerGateway,
    tenant_id: &TenantId,
    from_wallet: &str,
    to_wallet: &str,
) -> Result<()> {
    for wallet_id in [from_wallet, to_wallet] {
        match gateway
            .evaluate("TokenomicsContract", "GetBalance", &[wallet_id.to_string()])
            .await
        {
            Ok(balance) => match parse_balance(&balance) {
                Some(qirat) => read_model.set_wallet_balance(tenant_id, wallet_id, qirat).await?,
                None => warn!(wallet_id, "GetBalance returned a non-numeric balance, leaving cache stale"),
            },
            Err(e) => warn!(wallet_id, error = %e, "post-commit GetBalance query failed, leaving cache stale"),
        }
    }

    if let Some(debited) = read_model.get_wallet(tenant_id, from_wallet).await? {
        read_model
            .insert_notification(
                tenant_id,
                Uuid::new_v4(),
                &debited.profile_id,
                NotificationChannel::InApp,
                "WALLET_DEBITED",
                &format!("Your wallet {from_wallet} was debited; transfer to {to_wallet}."),
            )
            .await?;
    }
    if let Some(credited) = read_model.get_wallet(tenant_id, to_wallet).await? {
        read_model
            .insert_notification(
                tenant_id,
                Uuid::new_v4(),
                &credited.profile_id,
                NotificationChannel::InApp,
                "WALLET_CREDITED",
                &format!("Your wallet {to_wallet} was credited from {from_wallet}."),
            )
            .await?;
    }

    Ok(())
}
