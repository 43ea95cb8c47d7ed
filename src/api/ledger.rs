//! Ledger endpoints: listing, lookup, raw appends and integrity checks.

use crate::api::{error::ApiError, AppState};
use crate::auth::{require_role, Claims, UserRole};
use crate::ledger::{IntegrityReport, TransactionRecord, TransactionType};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Only records of this transaction type (case-insensitive).
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    /// Keep only the most recent `limit` records.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub count: usize,
    pub transactions: Vec<TransactionRecord>,
}

/// GET /api/ledger/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let mut transactions = match params.tx_type.as_deref() {
        Some(raw) => {
            let tx_type = TransactionType::from_str(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown transaction type: {}", raw)))?;
            state.ledger.transactions_of_type(tx_type)?
        }
        None => state.ledger.get_all_transactions()?,
    };

    if let Some(limit) = params.limit {
        let skip = transactions.len().saturating_sub(limit);
        transactions.drain(..skip);
    }

    Ok(Json(TransactionsResponse {
        count: transactions.len(),
        transactions,
    }))
}

/// GET /api/ledger/transactions/:tx_id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<Json<TransactionRecord>, ApiError> {
    state
        .ledger
        .find_transaction(&tx_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Transaction {} not found", tx_id)))
}

/// POST /api/ledger/transactions (admin only)
pub async fn append_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
    require_role(&claims, &[UserRole::Admin])?;

    let Value::Object(payload) = body else {
        return Err(ApiError::BadRequest(
            "Transaction payload must be a JSON object".to_string(),
        ));
    };

    let record = state.ledger.record_transaction(payload)?;
    info!(tx_id = %record.tx_id, admin = %claims.username, "Raw ledger append");

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/ledger/verify
pub async fn verify_ledger(
    State(state): State<AppState>,
) -> Result<Json<IntegrityReport>, ApiError> {
    Ok(Json(state.ledger.verify_integrity()?))
}
