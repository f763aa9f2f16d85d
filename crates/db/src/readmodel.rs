//! Read-model access (spec §3, §4.4 post-commit reconciliation, §4.5
//! projections). Mirrors the teacher's `db/` module: a thin struct wrapping
//! a `PgPool`, raw parameterised SQL, manual row-to-struct mapping.

use chrono::{DateTime, Utc};
use ledgerflow_domain::amount::Qirat;
use ledgerflow_domain::readmodel::{
    Notification, NotificationChannel, OnchainStatus, Transaction, UserProfile, UserStatus, Wallet,
};
use ledgerflow_domain::tenant::TenantId;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{DbError, Result};

pub struct ReadModelStore {
    pool: PgPool,
}

impl ReadModelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, tenant_id: &TenantId, profile_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query("select * from users where tenant_id = $1 and profile_id = $2")
            .bind(tenant_id.as_ref())
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn upsert_user(
        &self,
        tenant_id: &TenantId,
        profile_id: &str,
        account_id: &str,
        country_code: &str,
        status: UserStatus,
        onchain_status: OnchainStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into users (tenant_id, profile_id, account_id, country_code, status, onchain_status)
            values ($1, $2, $3, $4, $5, $6)
            on conflict (tenant_id, profile_id) do update set
                status = excluded.status,
                onchain_status = excluded.onchain_status,
                updated_at = now()
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(profile_id)
        .bind(account_id)
        .bind(country_code)
        .bind(status.as_db_str())
        .bind(onchain_status.as_db_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Spec §4.4 `CREATE_USER` reconciliation: activate the profile, marking
    /// the on-chain registration timestamp. A no-op if already `ACTIVE`.
    pub async fn activate_user(&self, tenant_id: &TenantId, profile_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            update users
            set status = 'ACTIVE', onchain_status = 'ACTIVE', updated_at = now()
            where tenant_id = $1 and profile_id = $2 and status != 'ACTIVE'
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(profile_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_wallet(&self, tenant_id: &TenantId, wallet_id: &str) -> Result<Option<Wallet>> {
        let row = sqlx::query("select * from wallets where tenant_id = $1 and wallet_id = $2")
            .bind(tenant_id.as_ref())
            .bind(wallet_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_wallet).transpose()
    }

    pub async fn get_primary_wallet_for_profile(
        &self,
        tenant_id: &TenantId,
        profile_id: &str,
    ) -> Result<Option<Wallet>> {
        let row = sqlx::query(
            "select * from wallets where tenant_id = $1 and profile_id = $2 order by created_at limit 1",
        )
        .bind(tenant_id.as_ref())
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_wallet).transpose()
    }

    /// Creates the primary wallet for a profile if none exists yet (spec
    /// §4.4 `CREATE_USER` reconciliation).
    pub async fn create_wallet_if_missing(
        &self,
        tenant_id: &TenantId,
        wallet_id: &str,
        profile_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into wallets (tenant_id, wallet_id, profile_id, onchain_status)
            values ($1, $2, $3, 'ACTIVE')
            on conflict (tenant_id, wallet_id) do nothing
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(wallet_id)
        .bind(profile_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_wallet_balance(
        &self,
        tenant_id: &TenantId,
        wallet_id: &str,
        balance: Qirat,
    ) -> Result<()> {
        sqlx::query(
            "update wallets set cached_balance = $3, updated_at = now() where tenant_id = $1 and wallet_id = $2",
        )
        .bind(tenant_id.as_ref())
        .bind(wallet_id)
        .bind(balance.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_transaction(
        &self,
        tenant_id: &TenantId,
        tx_id: Uuid,
        transaction_type: &str,
        from_wallet_id: Option<&str>,
        to_wallet_id: Option<&str>,
        amount: Qirat,
        fee: Qirat,
        blockchain_tx_id: Option<&str>,
        block_number: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into transactions
                (tenant_id, tx_id, transaction_type, from_wallet_id, to_wallet_id, amount, fee, blockchain_tx_id, block_number)
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            on conflict (tenant_id, tx_id) do nothing
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(tx_id)
        .bind(transaction_type)
        .bind(from_wallet_id)
        .bind(to_wallet_id)
        .bind(amount.to_string())
        .bind(fee.to_string())
        .bind(blockchain_tx_id)
        .bind(block_number)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_transaction(&self, tenant_id: &TenantId, tx_id: Uuid) -> Result<Option<Transaction>> {
        let row = sqlx::query("select * from transactions where tenant_id = $1 and tx_id = $2")
            .bind(tenant_id.as_ref())
            .bind(tx_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_transaction).transpose()
    }

    pub async fn insert_notification(
        &self,
        tenant_id: &TenantId,
        notification_id: Uuid,
        profile_id: &str,
        channel: NotificationChannel,
        subject: &str,
        body: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into notifications (tenant_id, notification_id, profile_id, channel, subject, body, sent_at)
            values ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(notification_id)
        .bind(profile_id)
        .bind(channel_to_db_str(channel))
        .bind(subject)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_event_log(
        &self,
        tenant_id: &TenantId,
        event_id: Uuid,
        event_type: &str,
        block_number: i64,
        tx_id: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into event_log (tenant_id, event_id, event_type, block_number, tx_id, payload)
            values ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(event_id)
        .bind(event_type)
        .bind(block_number)
        .bind(tx_id)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Has this `(blockNumber, txId)` already been recorded? (spec §4.5
    /// invariant 1, idempotent per-event processing).
    pub async fn event_already_recorded(
        &self,
        tenant_id: &TenantId,
        block_number: i64,
        tx_id: &str,
    ) -> Result<bool> {
        let row = sqlx::query(
            "select 1 from event_log where tenant_id = $1 and block_number = $2 and tx_id = $3",
        )
        .bind(tenant_id.as_ref())
        .bind(block_number)
        .bind(tx_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Transaction-scoped variants of the write paths the projector needs, so a
/// projection write and the checkpoint advance that follows it commit
/// atomically (spec §4.5 "Per-event processing" step 3).
pub mod tx {
    use super::*;
    use sqlx::{Postgres, Transaction};

    pub async fn insert_event_log(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        event_id: Uuid,
        event_type: &str,
        block_number: i64,
        tx_id: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into event_log (tenant_id, event_id, event_type, block_number, tx_id, payload)
            values ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(event_id)
        .bind(event_type)
        .bind(block_number)
        .bind(tx_id)
        .bind(payload)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn upsert_user(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        profile_id: &str,
        account_id: &str,
        country_code: &str,
        status: UserStatus,
        onchain_status: OnchainStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into users (tenant_id, profile_id, account_id, country_code, status, onchain_status)
            values ($1, $2, $3, $4, $5, $6)
            on conflict (tenant_id, profile_id) do update set
                status = excluded.status,
                onchain_status = excluded.onchain_status,
                updated_at = now()
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(profile_id)
        .bind(account_id)
        .bind(country_code)
        .bind(status.as_db_str())
        .bind(onchain_status.as_db_str())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn create_wallet_if_missing(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        wallet_id: &str,
        profile_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into wallets (tenant_id, wallet_id, profile_id, onchain_status)
            values ($1, $2, $3, 'ACTIVE')
            on conflict (tenant_id, wallet_id) do nothing
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(wallet_id)
        .bind(profile_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn set_wallet_balance(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        wallet_id: &str,
        balance: Qirat,
    ) -> Result<()> {
        sqlx::query(
            "update wallets set cached_balance = $3, updated_at = now() where tenant_id = $1 and wallet_id = $2",
        )
        .bind(tenant_id.as_ref())
        .bind(wallet_id)
        .bind(balance.to_string())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_transaction(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        tx_id: Uuid,
        transaction_type: &str,
        from_wallet_id: Option<&str>,
        to_wallet_id: Option<&str>,
        amount: Qirat,
        fee: Qirat,
        blockchain_tx_id: Option<&str>,
        block_number: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into transactions
                (tenant_id, tx_id, transaction_type, from_wallet_id, to_wallet_id, amount, fee, blockchain_tx_id, block_number)
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            on conflict (tenant_id, tx_id) do nothing
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(tx_id)
        .bind(transaction_type)
        .bind(from_wallet_id)
        .bind(to_wallet_id)
        .bind(amount.to_string())
        .bind(fee.to_string())
        .bind(blockchain_tx_id)
        .bind(block_number)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn insert_notification(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: &TenantId,
        notification_id: Uuid,
        profile_id: &str,
        channel: NotificationChannel,
        subject: &str,
        body: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into notifications (tenant_id, notification_id, profile_id, channel, subject, body, sent_at)
            values ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(notification_id)
        .bind(profile_id)
        .bind(channel_to_db_str(channel))
        .bind(subject)
        .bind(body)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn channel_to_db_str(channel: NotificationChannel) -> &'static str {
    match channel {
        NotificationChannel::Email => "EMAIL",
        NotificationChannel::Sms => "SMS",
        NotificationChannel::Push => "PUSH",
        NotificationChannel::InApp => "IN_APP",
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserProfile> {
    let tenant_id: String = row.try_get("tenant_id")?;
    let status: String = row.try_get("status")?;
    let onchain_status: String = row.try_get("onchain_status")?;
    Ok(UserProfile {
        tenant_id: TenantId::from(tenant_id),
        profile_id: row.try_get("profile_id")?,
        account_id: row.try_get("account_id")?,
        country_code: row.try_get("country_code")?,
        status: UserStatus::from_db_str(&status)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown user status: {status}")))?,
        onchain_status: OnchainStatus::from_db_str(&onchain_status)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown onchain status: {onchain_status}")))?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?,
    })
}

fn row_to_wallet(row: &sqlx::postgres::PgRow) -> Result<Wallet> {
    let tenant_id: String = row.try_get("tenant_id")?;
    let onchain_status: String = row.try_get("onchain_status")?;
    let cached_balance: String = row.try_get("cached_balance")?;
    Ok(Wallet {
        tenant_id: TenantId::from(tenant_id),
        wallet_id: row.try_get("wallet_id")?,
        profile_id: row.try_get("profile_id")?,
        cached_balance: cached_balance
            .parse()
            .map_err(|_| DbError::CorruptRow(format!("corrupt cached_balance: {cached_balance}")))?,
        onchain_status: OnchainStatus::from_db_str(&onchain_status)
            .ok_or_else(|| DbError::CorruptRow(format!("unknown onchain status: {onchain_status}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?,
    })
}

fn row_to_transaction(row: &sqlx::postgres::PgRow) -> Result<Transaction> {
    let tenant_id: String = row.try_get("tenant_id")?;
    let amount: String = row.try_get("amount")?;
    let fee: String = row.try_get("fee")?;
    Ok(Transaction {
        tenant_id: TenantId::from(tenant_id),
        tx_id: row.try_get("tx_id")?,
        transaction_type: row.try_get("transaction_type")?,
        from_wallet_id: row.try_get("from_wallet_id")?,
        to_wallet_id: row.try_get("to_wallet_id")?,
        amount: amount
            .parse()
            .map_err(|_| DbError::CorruptRow(format!("corrupt amount: {amount}")))?,
        fee: fee
            .parse()
            .map_err(|_| DbError::CorruptRow(format!("corrupt fee: {fee}")))?,
        purpose: row.try_get("purpose")?,
        category: row.try_get("category")?,
        external_ref: row.try_get("external_ref")?,
        blockchain_tx_id: row.try_get("blockchain_tx_id")?,
        block_number: row.try_get("block_number")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_reconciliation_requires_database() {
        // Requires a live Postgres instance; run with `cargo test -- --ignored`.
    }
}
