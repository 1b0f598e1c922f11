use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not `{"amount": <integer>}`. Echoes the raw body back.
    #[error("malformed submission: {reason}")]
    MalformedSubmission { reason: String, body: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            ApiError::MalformedSubmission { reason, body } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": reason, "body": body }),
            ),
            ApiError::Ledger(err) => {
                error!(%err, "ledger failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
            ApiError::Internal(msg) => {
                error!(%msg, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(payload)).into_response()
    }
}
