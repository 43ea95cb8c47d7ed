//! REST API
//!
//! Public: `/health`, `/api/auth/login`, `/api/auth/register`.
//! Everything else requires a bearer token.

pub mod error;
pub mod investments;
pub mod ledger;

pub use error::ApiError;

use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::ledger::Ledger;
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitLayer};
use crate::services::{InvestmentService, RevenueService};
use axum::{
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub investments: InvestmentService,
    pub revenue: RevenueService,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>, revenue: RevenueService) -> Self {
        Self {
            investments: InvestmentService::new(ledger.clone()),
            ledger,
            revenue,
        }
    }
}

/// Assemble the full router: public, authenticated and admin routes behind
/// request logging and per-IP rate limiting.
pub fn create_router(
    app_state: AppState,
    auth_state: AuthState,
    rate_limiter: RateLimitLayer,
) -> Router {
    let jwt_handler = auth_state.jwt_handler.clone();

    let public_routes = Router::new().route("/health", get(health_check));

    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/register", post(auth_api::register))
        .with_state(auth_state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/admin/users",
            get(auth_api::list_users).post(auth_api::create_user),
        )
        .route("/api/admin/users/:id", delete(auth_api::delete_user))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route(
            "/api/ledger/transactions",
            get(ledger::list_transactions).post(ledger::append_transaction),
        )
        .route(
            "/api/ledger/transactions/:tx_id",
            get(ledger::get_transaction),
        )
        .route("/api/ledger/verify", get(ledger::verify_ledger))
        .route("/api/investments", post(investments::post_investment))
        .route(
            "/api/videos/:video_id/investments",
            get(investments::get_video_investments),
        )
        .route("/api/revenue/distribute", post(investments::post_distribute))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware))
        .with_state(app_state);

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(request_logging))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
