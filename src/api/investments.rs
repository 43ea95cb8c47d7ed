//! Investment and revenue endpoints.
//!
//! The acting user always comes from the JWT: investors cannot invest on
//! someone else's behalf, and creators can only distribute their own videos.

use crate::api::{error::ApiError, AppState};
use crate::auth::{Claims, UserRole};
use crate::ledger::TransactionRecord;
use crate::services::{DistributionSummary, InvestmentRequest, VideoInvestmentSummary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestBody {
    pub video_id: String,
    pub to_creator: String,
    pub amount: f64,
    #[serde(default)]
    pub tx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeBody {
    pub video_id: String,
    /// Required for admins; creators may omit it.
    #[serde(default)]
    pub creator: Option<String>,
    pub total_revenue: f64,
}

/// POST /api/investments
pub async fn post_investment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<InvestBody>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
    let request = InvestmentRequest {
        video_id: body.video_id,
        from_user: claims.username,
        to_creator: body.to_creator,
        amount: body.amount,
        tx_id: body.tx_id,
    };

    let record = state.investments.record_investment(&request)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/videos/:video_id/investments
pub async fn get_video_investments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoInvestmentSummary>, ApiError> {
    Ok(Json(state.investments.video_summary(&video_id)?))
}

/// POST /api/revenue/distribute
pub async fn post_distribute(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<DistributeBody>,
) -> Result<(StatusCode, Json<DistributionSummary>), ApiError> {
    let creator = distributing_creator(&claims, body.creator)?;

    let summary = state
        .revenue
        .distribute(&body.video_id, &creator, body.total_revenue)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

fn distributing_creator(claims: &Claims, requested: Option<String>) -> Result<String, ApiError> {
    match claims.role {
        UserRole::Admin => requested.ok_or_else(|| {
            ApiError::BadRequest("creator required when distributing as admin".to_string())
        }),
        UserRole::Creator => match requested {
            Some(other) if other != claims.username => Err(ApiError::Forbidden(
                "Creators can only distribute revenue for their own videos".to_string(),
            )),
            _ => Ok(claims.username.clone()),
        },
        UserRole::Viewer => Err(ApiError::Forbidden(
            "Insufficient permissions".to_string(),
        )),
    }
}
