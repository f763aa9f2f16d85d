//! Error taxonomy for the projector worker.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectorError {
    #[error("database error: {0}")]
    Db(#[from] ledgerflow_db::DbError),

    #[error("gateway error: {0}")]
    Gateway(#[from] ledgerflow_gateway::GatewayError),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    #[error("malformed event payload for {event}: missing or invalid field {field}")]
    MalformedEvent { event: &'static str, field: &'static str },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ProjectorError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Db(_) | Self::Query(_) | Self::Config(_) => Level::ERROR,
            Self::Gateway(e) => e.log_level(),
            Self::UnknownEvent(_) | Self::MalformedEvent { .. } => Level::WARN,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectorError>;
