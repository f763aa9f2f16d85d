//! Submitter worker configuration: DB pool, outbox tunables, per-role wallet
//! material and the metrics/health bind address (spec §4.4/§6).

use ledgerflow_domain::outbox::OutboxTunables;
use ledgerflow_gateway::{GatewayConfig, IdentityConfig};
use serde::Deserialize;

/// Loads the three wallet identities named in spec §6 from a wallet
/// directory: `<wallet>/<name>-cert`, `<wallet>/<name>-key`, plus a shared
/// `<wallet>/tlsca-cert`.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub wallet_dir: String,
    pub peer_endpoint: String,
    pub msp_id: String,
    #[serde(default)]
    pub tls_sni_override: Option<String>,
}

impl WalletConfig {
    pub fn identity_config(&self, role_name: &str) -> IdentityConfig {
        IdentityConfig {
            peer_endpoint: self.peer_endpoint.clone(),
            peer_tls_ca_path: format!("{}/tlsca-cert", self.wallet_dir),
            msp_id: self.msp_id.clone(),
            signing_cert_path: format!("{}/{}-cert", self.wallet_dir, role_name),
            signing_key_path: format!("{}/{}-key", self.wallet_dir, role_name),
            tls_sni_override: self.tls_sni_override.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitterConfig {
    pub super_admin_wallet: WalletConfig,
    pub admin_wallet: WalletConfig,
    pub partner_api_wallet: WalletConfig,

    pub gateway: GatewayConfigSeed,

    #[serde(default)]
    pub outbox: OutboxTunables,

    #[serde(default = "default_worker_id")]
    pub worker_id: String,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// The channel-wide fields of [`GatewayConfig`], loaded once and reused to
/// build one `GatewayConfig` per identity (breaker state is per-identity,
/// so each role gets its own `GatewayClient`, never a shared one).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfigSeed {
    pub channel_name: String,
    pub chaincode_name: String,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
    #[serde(default = "default_failure_threshold")]
    pub circuit_failure_threshold: f64,
    #[serde(default = "default_min_volume")]
    pub circuit_min_volume: u32,
    #[serde(default = "default_open_duration_secs")]
    pub circuit_open_duration_secs: u64,
}

impl GatewayConfigSeed {
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            channel_name: self.channel_name.clone(),
            chaincode_name: self.chaincode_name.clone(),
            keep_alive_secs: self.keep_alive_secs,
            submit_timeout_secs: self.submit_timeout_secs,
            circuit_failure_threshold: self.circuit_failure_threshold,
            circuit_min_volume: self.circuit_min_volume,
            circuit_open_duration_secs: self.circuit_open_duration_secs,
        }
    }
}

fn default_keep_alive_secs() -> u64 {
    30
}
fn default_submit_timeout_secs() -> u64 {
    120
}
fn default_failure_threshold() -> f64 {
    0.5
}
fn default_min_volume() -> u32 {
    5
}
fn default_open_duration_secs() -> u64 {
    30
}
fn default_worker_id() -> String {
    format!("submitter-{}", uuid::Uuid::new_v4())
}
fn default_metrics_port() -> u16 {
    9100
}

impl SubmitterConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }
}
