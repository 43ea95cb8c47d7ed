//! Domain Services
//!
//! Business rules that record their outcomes on the ledger:
//! 1. Investment recording (viewer stakes currency in a creator's video)
//! 2. Revenue distribution (creator / investors / platform split)

pub mod investment;
pub mod revenue;

pub use investment::{InvestmentRequest, InvestmentService, VideoInvestmentSummary};
pub use revenue::{DistributionShare, DistributionSummary, RevenueService, RevenueSplit};

use crate::ledger::LedgerError;

/// Token symbol recorded on every monetary ledger entry.
pub const CURRENCY: &str = "SOCIORA";

#[derive(Debug)]
pub enum ServiceError {
    /// The request was rejected before touching the ledger.
    Validation(String),
    Ledger(LedgerError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ServiceError::Ledger(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Ledger(e) => Some(e),
            ServiceError::Validation(_) => None,
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(e: LedgerError) -> Self {
        ServiceError::Ledger(e)
    }
}

/// Rounds a token amount to 8 decimal places.
pub(crate) fn round_amount(amount: f64) -> f64 {
    (amount * 1e8).round() / 1e8
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} required", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn require_positive(field: &str, value: f64) -> Result<f64, ServiceError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ServiceError::Validation(format!(
            "{} must be a positive number",
            field
        )));
    }
    Ok(value)
}
