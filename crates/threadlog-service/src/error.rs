//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use threadlog_core::api::{ApiErrorBody, ApiErrorResponse};
use threadlog_core::{Address, LedgerError, ProgramError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Nothing stored at the requested address.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The address is already occupied.
    #[error("record already exists at {0}")]
    AlreadyExists(Address),

    /// The ledger program refused the write.
    #[error("rejected: {0}")]
    Rejected(ProgramError),

    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::AlreadyExists(_) => (
                StatusCode::CONFLICT,
                "already_exists",
                self.to_string(),
                None,
            ),
            Self::Rejected(program_error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "rejected",
                program_error.to_string(),
                Some(serde_json::json!({
                    "program_code": program_error.code(),
                    "program_error": program_error.name(),
                })),
            ),
            Self::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Ledger unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    msg.clone(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyExists { address } => Self::AlreadyExists(address),
            LedgerError::Rejected(program_error) => Self::Rejected(program_error),
            LedgerError::Transport(msg) => Self::Unavailable(msg),
            LedgerError::Storage(msg) | LedgerError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
