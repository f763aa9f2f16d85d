//! HTTP idempotency cache (spec §3 `HttpIdempotency`, §4.2).
//!
//! Postgres-backed rather than Redis-backed: the spec models idempotency as
//! a relational row (`http_idempotency`, migration `0002_outbox.sql`), and
//! that table already exists for the outbox/projector services to share, so
//! there is no second store to run.

use chrono::{Duration, Utc};
use ledgerflow_domain::idempotency::HttpIdempotency;
use ledgerflow_domain::tenant::TenantId;
use sqlx::{PgPool, Row};

use crate::error::{ApiError, Result};

#[derive(Clone)]
pub struct CacheManager {
    pool: PgPool,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(pool: PgPool, ttl_hours: i64) -> Self {
        Self {
            pool,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Returns a cached response for this key if one exists and has not
    /// expired (spec §4.2 "idempotent replay").
    pub async fn get(
        &self,
        tenant_id: &TenantId,
        idempotency_key: &str,
    ) -> Result<Option<HttpIdempotency>> {
        let row = sqlx::query(
            "select * from http_idempotency where tenant_id = $1 and idempotency_key = $2",
        )
        .bind(tenant_id.as_ref())
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        let Some(row) = row else { return Ok(None) };
        let entry = row_to_entry(&row).map_err(ApiError::Database)?;
        if entry.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Records a response under `idempotency_key`, replacing any prior entry
    /// for the same key (a retried request with the same key always wins).
    #[allow(clippy::too_many_arguments)]
    pub async fn put(
        &self,
        tenant_id: &TenantId,
        idempotency_key: &str,
        method: &str,
        path: &str,
        body_hash: &str,
        status_code: u16,
        response_body: &serde_json::Value,
    ) -> Result<()> {
        let expires_at = Utc::now() + self.ttl;
        sqlx::query(
            r#"
            insert into http_idempotency
                (tenant_id, idempotency_key, method, path, body_hash, status_code, response_headers, response_body, ttl_expires_at)
            values ($1, $2, $3, $4, $5, $6, '{}'::jsonb, $7, $8)
            on conflict (tenant_id, idempotency_key) do update set
                method = excluded.method,
                path = excluded.path,
                body_hash = excluded.body_hash,
                status_code = excluded.status_code,
                response_body = excluded.response_body,
                ttl_expires_at = excluded.ttl_expires_at
            "#,
        )
        .bind(tenant_id.as_ref())
        .bind(idempotency_key)
        .bind(method)
        .bind(path)
        .bind(body_hash)
        .bind(status_code as i16)
        .bind(response_body)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;
        Ok(())
    }
}

fn row_to_entry(row: &sqlx::postgres::PgRow) -> std::result::Result<HttpIdempotency, sqlx::Error> {
    let tenant_id: String = row.try_get("tenant_id")?;
    let status_code: i16 = row.try_get("status_code")?;
    Ok(HttpIdempotency {
        tenant_id: TenantId::from(tenant_id),
        idempotency_key: row.try_get("idempotency_key")?,
        method: row.try_get("method")?,
        path: row.try_get("path")?,
        body_hash: row.try_get("body_hash")?,
        status_code: status_code as u16,
        response_headers: row.try_get("response_headers")?,
        response_body: row.try_get("response_body")?,
        ttl_expires_at: row.try_get("ttl_expires_at")?,
    })
}
