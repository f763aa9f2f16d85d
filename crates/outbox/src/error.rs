use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutboxError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("row violates outbox invariants: {0}")]
    CorruptRow(String),
}

impl OutboxError {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::ERROR
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

pub type Result<T> = std::result::Result<T, OutboxError>;
