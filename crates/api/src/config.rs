//! API server configuration (spec §4.2 HTTP boundary / §6 "Configuration").

use serde::Deserialize;

/// Wallet identity material for the single read-only gateway connection this
/// service keeps open to report readiness (spec §6 identity roles).
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub wallet_dir: String,
    pub peer_endpoint: String,
    pub msp_id: String,
    pub tls_sni_override: Option<String>,
}

impl WalletConfig {
    pub fn identity_config(&self, identity_name: &str) -> ledgerflow_gateway::IdentityConfig {
        ledgerflow_gateway::IdentityConfig {
            peer_endpoint: self.peer_endpoint.clone(),
            peer_tls_ca_path: format!("{}/{}/tls-ca.pem", self.wallet_dir, identity_name),
            msp_id: self.msp_id.clone(),
            signing_cert_path: format!("{}/{}/cert.pem", self.wallet_dir, identity_name),
            signing_key_path: format!("{}/{}/key.pem", self.wallet_dir, identity_name),
            tls_sni_override: self.tls_sni_override.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfigSeed {
    pub channel_name: String,
    pub chaincode_name: String,
}

impl GatewayConfigSeed {
    pub fn to_gateway_config(&self) -> ledgerflow_gateway::GatewayConfig {
        ledgerflow_gateway::GatewayConfig {
            channel_name: self.channel_name.clone(),
            chaincode_name: self.chaincode_name.clone(),
            keep_alive_secs: 30,
            submit_timeout_secs: 120,
            circuit_failure_threshold: 0.5,
            circuit_min_volume: 5,
            circuit_open_duration_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub wallet: WalletConfig,

    #[serde(default = "default_identity_name")]
    pub identity_name: String,

    pub gateway: GatewayConfigSeed,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    #[serde(default = "default_idempotency_ttl_hours")]
    pub idempotency_ttl_hours: i64,
}

fn default_identity_name() -> String {
    "org1-partner-api".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_enable_cors() -> bool {
    true
}
fn default_idempotency_ttl_hours() -> i64 {
    24
}

impl ApiConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }
}
