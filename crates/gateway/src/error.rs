//! Error taxonomy for the ledger gateway client (spec §4.1).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("connection to peer failed: {0}")]
    Connection(String),

    /// Timeout does not imply abort — callers must treat the outcome as
    /// unknown until the event stream or a query confirms it either way.
    #[error("submit timed out after {timeout_secs}s, tx_id: {tx_id:?}")]
    Timeout {
        timeout_secs: u64,
        tx_id: Option<String>,
    },

    #[error("chaincode returned an error: {message}")]
    Chaincode { message: String },

    #[error("endorsement failed: {message}")]
    Endorsement { message: String },

    #[error("circuit breaker is open, rejecting submit")]
    CircuitOpen,

    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Connection(_) => Level::ERROR,
            Self::Timeout { .. } => Level::WARN,
            Self::Chaincode { .. } => Level::WARN,
            Self::Endorsement { .. } => Level::WARN,
            Self::CircuitOpen => Level::WARN,
            Self::Config(_) => Level::ERROR,
        }
    }

    /// Whether a caller may safely retry the same call. Timeouts are
    /// deliberately excluded: retrying a submit whose outcome is unknown
    /// can double-submit, so callers must reconcile via the event stream
    /// first (spec §4.1).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::CircuitOpen)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_secs: 120,
                tx_id: None,
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
