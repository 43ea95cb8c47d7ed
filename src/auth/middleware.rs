//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, UserRole},
};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates `Authorization: Bearer <token>`.
///
/// Valid claims are inserted into request extensions; handlers read them with
/// `Extension<Claims>`.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidFormat)?;

    let claims = jwt_handler.validate_token(token).map_err(|e| {
        debug!("Rejected token: {:#}", e);
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Fails with `Forbidden` unless the caller holds one of `allowed`.
pub fn require_role(claims: &Claims, allowed: &[UserRole]) -> Result<(), AuthError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Auth error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization format. Use: Bearer {token}",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
