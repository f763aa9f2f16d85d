//! Tenant scoping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every row in the system belongs to a tenant. Producers that don't care about
/// multi-tenancy get `TenantId::default()`, which serializes as `"default"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl Default for TenantId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tenant_is_default_string() {
        assert_eq!(TenantId::default().0, "default");
    }

    #[test]
    fn display_matches_inner_string() {
        let t = TenantId::from("acme");
        assert_eq!(t.to_string(), "acme");
    }
}
