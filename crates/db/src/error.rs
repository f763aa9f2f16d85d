//! Error types for the database layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(String),

    #[error("corrupt read-model row: {0}")]
    CorruptRow(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {field}, reason: {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl DbError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Connection(_) | Self::Migration(_) => Level::ERROR,
            Self::Config(_) | Self::InvalidConfig { .. } => Level::ERROR,
            Self::Query(_) => Level::ERROR,
            Self::CorruptRow(_) => Level::ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
