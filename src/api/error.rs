use crate::auth::AuthError;
use crate::ledger::LedgerError;
use crate::services::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Ledger(e) => ApiError::Ledger(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Forbidden("Insufficient permissions".to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(err) => match err {
                LedgerError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                LedgerError::DuplicateIdentity(_) => StatusCode::CONFLICT,
                LedgerError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
                LedgerError::Io(_) | LedgerError::CorruptData(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Ledger(err) => {
                if status.is_server_error() {
                    tracing::error!(kind = err.kind(), "Ledger error: {}", err);
                }
                json!({ "error": err.to_string(), "kind": err.kind() })
            }
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Forbidden(msg) => {
                json!({ "error": msg })
            }
        };

        (status, Json(body)).into_response()
    }
}
