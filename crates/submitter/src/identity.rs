//! One `GatewayClient` per configured identity role (spec §4.4 "Identity
//! selection"/§5 "Gateway clients are not shared across identities").

use ledgerflow_domain::command::IdentityRole;
use ledgerflow_gateway::{GatewayClient, GatewayConfig, LedgerGateway};
use std::sync::Arc;

use crate::config::SubmitterConfig;

pub struct IdentityPool {
    super_admin: Arc<GatewayClient>,
    admin: Arc<GatewayClient>,
    partner_api: Arc<GatewayClient>,
}

impl IdentityPool {
    pub fn new(config: &SubmitterConfig) -> Self {
        let gateway_config: GatewayConfig = config.gateway.to_gateway_config();

        let super_admin = GatewayClient::new(
            config.super_admin_wallet.identity_config(IdentityRole::SuperAdmin.wallet_name()),
            gateway_config.clone(),
        );
        let admin = GatewayClient::new(
            config.admin_wallet.identity_config(IdentityRole::Admin.wallet_name()),
            gateway_config.clone(),
        );
        let partner_api = GatewayClient::new(
            config.partner_api_wallet.identity_config(IdentityRole::PartnerApi.wallet_name()),
            gateway_config,
        );

        Self {
            super_admin: Arc::new(super_admin),
            admin: Arc::new(admin),
            partner_api: Arc::new(partner_api),
        }
    }

    pub fn for_role(&self, role: IdentityRole) -> Arc<GatewayClient> {
        match role {
            IdentityRole::SuperAdmin => self.super_admin.clone(),
            IdentityRole::Admin => self.admin.clone(),
            IdentityRole::PartnerApi => self.partner_api.clone(),
        }
    }

    pub async fn connect_all(&self) -> ledgerflow_gateway::Result<()> {
        self.super_admin.connect().await?;
        self.admin.connect().await?;
        self.partner_api.connect().await?;
        Ok(())
    }

    /// Per-identity breaker snapshots for the `/health` endpoint.
    pub fn breaker_snapshot(&self) -> Vec<(&'static str, ledgerflow_gateway::CircuitBreakerStats)> {
        vec![
            ("org1-super-admin", self.super_admin.circuit_breaker_stats()),
            ("org1-admin", self.admin.circuit_breaker_stats()),
            ("org1-partner-api", self.partner_api.circuit_breaker_stats()),
        ]
    }
}
