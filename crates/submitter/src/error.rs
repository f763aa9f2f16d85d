//! Error taxonomy for the submitter worker.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitterError {
    #[error("database error: {0}")]
    Db(#[from] ledgerflow_db::DbError),

    #[error("outbox error: {0}")]
    Outbox(#[from] ledgerflow_outbox::OutboxError),

    #[error("gateway error: {0}")]
    Gateway(#[from] ledgerflow_gateway::GatewayError),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("unsupported command type: {0}")]
    UnsupportedCommand(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {field}, reason: {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl SubmitterError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Db(_) | Self::Query(_) | Self::Config(_) | Self::InvalidConfig { .. } => {
                Level::ERROR
            }
            Self::Gateway(e) => e.log_level(),
            Self::Outbox(_) => Level::ERROR,
            Self::UnsupportedCommand(_) => Level::WARN,
        }
    }
}

pub type Result<T> = std::result::Result<T, SubmitterError>;
