//! HTTP idempotency cache row (spec §3 `HttpIdempotency`).

use crate::tenant::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpIdempotency {
    pub tenant_id: TenantId,
    pub idempotency_key: String,
    pub method: String,
    pub path: String,
    pub body_hash: String,
    pub status_code: u16,
    pub response_headers: serde_json::Value,
    pub response_body: serde_json::Value,
    pub ttl_expires_at: DateTime<Utc>,
}

impl HttpIdempotency {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.ttl_expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> HttpIdempotency {
        HttpIdempotency {
            tenant_id: TenantId::default(),
            idempotency_key: "abc123".to_string(),
            method: "POST".to_string(),
            path: "/api/v1/transfers".to_string(),
            body_hash: "deadbeef".to_string(),
            status_code: 201,
            response_headers: serde_json::json!({}),
            response_body: serde_json::json!({"ok": true}),
            ttl_expires_at: Utc::now() + Duration::hours(24),
        }
    }

    #[test]
    fn not_expired_within_ttl() {
        assert!(!sample().is_expired(Utc::now()));
    }

    #[test]
    fn expired_after_ttl() {
        let row = sample();
        assert!(row.is_expired(Utc::now() + Duration::hours(25)));
    }
}
