//! Authentication API Endpoints
//! Mission: Login, signup and admin user management

use crate::auth::{
    jwt::JwtHandler,
    middleware::require_role,
    models::{
        Claims, LoginRequest, LoginResponse, RegisterRequest, User, UserResponse, UserRole,
    },
    user_store::UserStore,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }

    fn issue(&self, user: &User) -> Result<LoginResponse, AuthApiError> {
        let (token, expires_in) = self
            .jwt_handler
            .generate_token(user)
            .map_err(|_| AuthApiError::InternalError)?;

        Ok(LoginResponse {
            token,
            expires_in,
            role: user.role.clone(),
            user: UserResponse::from_user(user),
        })
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let valid = state
        .user_store
        .verify_password(&payload.username, &payload.password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_username(&payload.username)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::InvalidCredentials)?;

    info!(
        "✅ Login successful: {} ({})",
        user.username,
        user.role.as_str()
    );

    Ok(Json(state.issue(&user)?))
}

/// Signup endpoint - POST /api/auth/register (viewer or creator accounts)
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AuthApiError> {
    if payload.role == UserRole::Admin {
        return Err(AuthApiError::Forbidden);
    }
    validate_credentials(&payload.username, &payload.password)?;

    let user = state
        .user_store
        .create_user(payload.username.trim(), &payload.password, payload.role)
        .map_err(|e| {
            warn!("Failed to register user: {:#}", e);
            AuthApiError::UserAlreadyExists
        })?;

    Ok((StatusCode::CREATED, Json(state.issue(&user)?)))
}

/// Get current user info - GET /api/auth/me
/// Built from the JWT claims, no database lookup needed
pub async fn get_current_user(Extension(claims): Extension<Claims>) -> Json<UserResponse> {
    Json(UserResponse {
        id: claims.sub,
        username: claims.username,
        role: claims.role,
        created_at: String::new(),
    })
}

/// List all users - GET /api/admin/users (Admin only)
pub async fn list_users(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, AuthApiError> {
    require_role(&claims, &[UserRole::Admin]).map_err(|_| AuthApiError::Forbidden)?;

    let users = state
        .user_store
        .list_users()
        .map_err(|_| AuthApiError::InternalError)?;

    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// Create user - POST /api/admin/users (Admin only)
pub async fn create_user(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthApiError> {
    require_role(&claims, &[UserRole::Admin]).map_err(|_| AuthApiError::Forbidden)?;
    validate_credentials(&payload.username, &payload.password)?;

    let user = state
        .user_store
        .create_user(payload.username.trim(), &payload.password, payload.role)
        .map_err(|e| {
            warn!("Failed to create user: {:#}", e);
            AuthApiError::UserAlreadyExists
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Delete user - DELETE /api/admin/users/:id (Admin only)
pub async fn delete_user(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AuthApiError> {
    require_role(&claims, &[UserRole::Admin]).map_err(|_| AuthApiError::Forbidden)?;

    let uuid = Uuid::parse_str(&user_id).map_err(|_| AuthApiError::InvalidUserId)?;

    if uuid.to_string() == claims.sub {
        return Err(AuthApiError::CannotDeleteSelf);
    }

    state
        .user_store
        .delete_user(&uuid)
        .map_err(|_| AuthApiError::UserNotFound)?;

    info!("🗑️  User deleted: {}", user_id);

    Ok(StatusCode::NO_CONTENT)
}

fn validate_credentials(username: &str, password: &str) -> Result<(), AuthApiError> {
    if username.trim().is_empty() {
        return Err(AuthApiError::InvalidUsername);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }
    Ok(())
}

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Forbidden,
    UserNotFound,
    UserAlreadyExists,
    InvalidUsername,
    WeakPassword,
    InvalidUserId,
    CannotDeleteSelf,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, "Username already exists"),
            AuthApiError::InvalidUsername => (StatusCode::BAD_REQUEST, "Username required"),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 8 characters",
            ),
            AuthApiError::InvalidUserId => (StatusCode::BAD_REQUEST, "Invalid user ID format"),
            AuthApiError::CannotDeleteSelf => {
                (StatusCode::BAD_REQUEST, "Cannot delete your own account")
            }
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
