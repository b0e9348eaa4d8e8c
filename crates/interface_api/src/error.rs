//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_ledger::{TransferError, TransferErrorKind};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Transfer(#[from] TransferError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Debtor account, for transfer errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debtor: Option<i32>,
    /// Creditor account, for transfer errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor: Option<i32>,
}

impl ErrorResponse {
    fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            debtor: None,
            creditor: None,
        }
    }
}

fn transfer_response(err: &TransferError) -> (StatusCode, ErrorResponse) {
    let status = match &err.kind {
        TransferErrorKind::UnknownAccount { .. } => StatusCode::NOT_FOUND,
        TransferErrorKind::InvalidAmount { .. }
        | TransferErrorKind::SameAccount
        | TransferErrorKind::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
        TransferErrorKind::TransferFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Store diagnostics are only surfaced for balance violations.
    let details = match &err.kind {
        TransferErrorKind::InsufficientFunds { diagnostic: Some(diagnostic), .. } => {
            Some(vec![diagnostic.clone()])
        }
        _ => None,
    };

    let body = ErrorResponse {
        details,
        debtor: Some(err.debtor.value()),
        creditor: Some(err.creditor.value()),
        ..ErrorResponse::new(err.kind.code(), err.reason())
    };
    (status, body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone())),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new("bad_request", msg.clone())),
            ApiError::Transfer(err) => transfer_response(err),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("unavailable", msg.clone()),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("internal_error", msg.clone()),
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{} {} not found", entity_type, id))
            }
            PortError::Validation { message, .. } => ApiError::BadRequest(message),
            PortError::Connection { message, .. } => ApiError::Unavailable(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
