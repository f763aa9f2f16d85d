//! Error types for the API, mapped to HTTP responses at the boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("read model error: {0}")]
    ReadModel(#[from] ledgerflow_db::DbError),

    #[error("outbox error: {0}")]
    Outbox(#[from] ledgerflow_outbox::OutboxError),

    #[error(transparent)]
    Approval(#[from] ledgerflow_approvals::ApprovalError),

    #[error("unknown command type: {0}")]
    UnknownCommandType(String),

    #[error("malformed command payload: {0}")]
    MalformedCommand(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::UnknownCommandType(_) | ApiError::MalformedCommand(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Approval(e) => match e {
                ledgerflow_approvals::ApprovalError::NotFound(_) => StatusCode::NOT_FOUND,
                ledgerflow_approvals::ApprovalError::NotPending(_)
                | ledgerflow_approvals::ApprovalError::DuplicateVote { .. }
                | ledgerflow_approvals::ApprovalError::NotInitiator(_)
                | ledgerflow_approvals::ApprovalError::NoRuleMatched => StatusCode::CONFLICT,
                ledgerflow_approvals::ApprovalError::Query(_)
                | ledgerflow_approvals::ApprovalError::CorruptRow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_)
            | ApiError::Database(_)
            | ApiError::ReadModel(_)
            | ApiError::Outbox(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
