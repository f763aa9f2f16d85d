use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("pending transaction {0} not found")]
    NotFound(Uuid),

    #[error("pending transaction {0} is not PENDING")]
    NotPending(Uuid),

    #[error("voter {voter_id} has already voted on {pending_tx_id}")]
    DuplicateVote { pending_tx_id: Uuid, voter_id: String },

    #[error("only the initiator may cancel pending transaction {0}")]
    NotInitiator(Uuid),

    #[error("no active signatory rule matches this action; it executes without approval")]
    NoRuleMatched,

    #[error("row violates approval invariants: {0}")]
    CorruptRow(String),
}

impl ApprovalError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Query(_) | Self::CorruptRow(_) => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApprovalError>;
