use serde::Deserialize;

/// Per-identity connection material (spec §4.1 "Configuration").
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub peer_endpoint: String,
    pub peer_tls_ca_path: String,
    pub msp_id: String,
    pub signing_cert_path: String,
    pub signing_key_path: String,
    pub tls_sni_override: Option<String>,
}

/// Channel-wide gateway configuration, shared across identities.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
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

impl GatewayConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().prefix("GATEWAY"))
            .build()?;
        cfg.try_deserialize()
    }
}
