//! Revenue Distribution
//!
//! Splits a video's revenue between its creator, its investors and the
//! platform. The investor pool is divided pro rata by each investor's
//! recorded stake in the video; without investors the pool goes to the
//! creator. Every non-zero share becomes one ledger record, and all records of
//! one distribution carry the same `distributionId`.
//!
//! A ledger failure part-way through leaves the earlier shares recorded (the
//! ledger never rolls back); callers reconcile by `distributionId`.

use crate::ledger::{Ledger, Payload, TransactionType};
use crate::services::{
    investment::InvestmentService, require_non_empty, require_positive, round_amount,
    ServiceError, CURRENCY,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Allowed drift of the percentage sum away from 100.
const SPLIT_TOLERANCE: f64 = 0.01;

/// Account recorded as the sender of distributed revenue.
pub const REVENUE_POOL_ACCOUNT: &str = "revenue-pool";

/// Percentages (0-100) of revenue per beneficiary class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RevenueSplit {
    pub creator: f64,
    pub investors: f64,
    pub platform: f64,
}

impl Default for RevenueSplit {
    fn default() -> Self {
        Self {
            creator: 70.0,
            investors: 20.0,
            platform: 10.0,
        }
    }
}

impl RevenueSplit {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let parts = [self.creator, self.investors, self.platform];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(ServiceError::Validation(
                "revenue split percentages must be non-negative".to_string(),
            ));
        }

        let total: f64 = parts.iter().sum();
        if (total - 100.0).abs() > SPLIT_TOLERANCE {
            return Err(ServiceError::Validation(format!(
                "revenue split percentages must sum to 100, got {}",
                total
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryRole {
    Creator,
    Investor,
    Platform,
}

impl BeneficiaryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryRole::Creator => "creator",
            BeneficiaryRole::Investor => "investor",
            BeneficiaryRole::Platform => "platform",
        }
    }

    fn tx_type(&self) -> TransactionType {
        match self {
            BeneficiaryRole::Platform => TransactionType::PlatformFee,
            _ => TransactionType::Distribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionShare {
    pub beneficiary: String,
    pub role: BeneficiaryRole,
    pub amount: f64,
    pub tx_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub distribution_id: String,
    pub video_id: String,
    pub total_revenue: f64,
    pub split: RevenueSplit,
    pub shares: Vec<DistributionShare>,
}

#[derive(Clone)]
pub struct RevenueService {
    ledger: Arc<dyn Ledger>,
    investments: InvestmentService,
    split: RevenueSplit,
    platform_account: String,
}

impl RevenueService {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        split: RevenueSplit,
        platform_account: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        split.validate()?;
        Ok(Self {
            investments: InvestmentService::new(ledger.clone()),
            ledger,
            split,
            platform_account: platform_account.into(),
        })
    }

    pub fn distribute(
        &self,
        video_id: &str,
        creator: &str,
        total_revenue: f64,
    ) -> Result<DistributionSummary, ServiceError> {
        let video_id = require_non_empty("videoId", video_id)?;
        let creator = require_non_empty("creator", creator)?;
        let total_revenue = require_positive("totalRevenue", total_revenue)?;

        let stakes = self.investments.video_summary(&video_id)?;
        if let Some(owner) = &stakes.creator {
            if *owner != creator {
                return Err(ServiceError::Validation(format!(
                    "video {} belongs to {}, not {}",
                    video_id, owner, creator
                )));
            }
        }

        let mut creator_amount = total_revenue * self.split.creator / 100.0;
        let investor_pool = total_revenue * self.split.investors / 100.0;
        let platform_amount = total_revenue * self.split.platform / 100.0;

        let mut planned: Vec<(String, BeneficiaryRole, f64)> = Vec::new();
        if stakes.total_invested > 0.0 {
            for (investor, stake) in &stakes.investors {
                let amount = investor_pool * stake / stakes.total_invested;
                planned.push((investor.clone(), BeneficiaryRole::Investor, amount));
            }
        } else {
            creator_amount += investor_pool;
        }
        planned.insert(0, (creator.clone(), BeneficiaryRole::Creator, creator_amount));
        planned.push((
            self.platform_account.clone(),
            BeneficiaryRole::Platform,
            platform_amount,
        ));

        let distribution_id = Uuid::new_v4().to_string();
        let mut shares = Vec::with_capacity(planned.len());

        for (beneficiary, role, amount) in planned {
            let amount = round_amount(amount);
            if amount <= 0.0 {
                continue;
            }

            let mut payload = Payload::new();
            payload.insert("distributionId".to_string(), json!(distribution_id));
            payload.insert("videoId".to_string(), json!(video_id));
            payload.insert("fromUser".to_string(), json!(REVENUE_POOL_ACCOUNT));
            payload.insert("toUser".to_string(), json!(beneficiary));
            payload.insert("role".to_string(), json!(role.as_str()));
            payload.insert("amount".to_string(), json!(amount));
            payload.insert("currency".to_string(), json!(CURRENCY));
            payload.insert("type".to_string(), json!(role.tx_type().as_str()));

            let record = self.ledger.record_transaction(payload).map_err(|e| {
                warn!(
                    distribution_id = %distribution_id,
                    recorded = shares.len(),
                    error = %e,
                    "Revenue distribution interrupted"
                );
                e
            })?;

            shares.push(DistributionShare {
                beneficiary,
                role,
                amount,
                tx_id: record.tx_id,
            });
        }

        info!(
            distribution_id = %distribution_id,
            video_id = %video_id,
            total_revenue,
            shares = shares.len(),
            "Revenue distributed"
        );

        Ok(DistributionSummary {
            distribution_id,
            video_id,
            total_revenue,
            split: self.split,
            shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::services::InvestmentRequest;

    fn create_test_services() -> (RevenueService, InvestmentService, Arc<dyn Ledger>) {
        let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
        let revenue =
            RevenueService::new(ledger.clone(), RevenueSplit::default(), "platform").unwrap();
        let investments = InvestmentService::new(ledger.clone());
        (revenue, investments, ledger)
    }

    fn invest(service: &InvestmentService, investor: &str, amount: f64) {
        service
            .record_investment(&InvestmentRequest {
                video_id: "vid-1".to_string(),
                from_user: investor.to_string(),
                to_creator: "maya".to_string(),
                amount,
                tx_id: None,
            })
            .unwrap();
    }

    fn share_of(summary: &DistributionSummary, beneficiary: &str) -> f64 {
        summary
            .shares
            .iter()
            .find(|s| s.beneficiary == beneficiary)
            .map(|s| s.amount)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_split_validation() {
        assert!(RevenueSplit::default().validate().is_ok());
        assert!(RevenueSplit {
            creator: 60.0,
            investors: 30.0,
            platform: 10.005,
        }
        .validate()
        .is_ok());
        assert!(RevenueSplit {
            creator: 60.0,
            investors: 30.0,
            platform: 20.0,
        }
        .validate()
        .is_err());
        assert!(RevenueSplit {
            creator: 110.0,
            investors: -20.0,
            platform: 10.0,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_invalid_split_rejected_at_construction() {
        let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
        let split = RevenueSplit {
            creator: 50.0,
            investors: 0.0,
            platform: 0.0,
        };
        assert!(RevenueService::new(ledger, split, "platform").is_err());
    }

    #[test]
    fn test_investor_pool_is_pro_rata() {
        let (revenue, investments, ledger) = create_test_services();
        invest(&investments, "alice", 300.0);
        invest(&investments, "bob", 100.0);

        let summary = revenue.distribute("vid-1", "maya", 1000.0).unwrap();

        assert_eq!(share_of(&summary, "maya"), 700.0);
        assert_eq!(share_of(&summary, "alice"), 150.0);
        assert_eq!(share_of(&summary, "bob"), 50.0);
        assert_eq!(share_of(&summary, "platform"), 100.0);
        assert_eq!(summary.shares[0].role, BeneficiaryRole::Creator);

        let records = ledger.get_all_transactions().unwrap();
        let distribution: Vec<_> = records
            .iter()
            .filter(|r| r.payload_str("distributionId") == Some(summary.distribution_id.as_str()))
            .collect();
        assert_eq!(distribution.len(), 4);

        let fee = distribution
            .iter()
            .find(|r| r.payload_str("toUser") == Some("platform"))
            .unwrap();
        assert_eq!(fee.tx_type(), Some(TransactionType::PlatformFee));
    }

    #[test]
    fn test_no_investors_pool_goes_to_creator() {
        let (revenue, _investments, ledger) = create_test_services();

        let summary = revenue.distribute("vid-1", "maya", 50.0).unwrap();
        assert_eq!(summary.shares.len(), 2);
        assert_eq!(share_of(&summary, "maya"), 45.0);
        assert_eq!(share_of(&summary, "platform"), 5.0);
        assert_eq!(ledger.get_all_transactions().unwrap().len(), 2);
    }

    #[test]
    fn test_wrong_creator_rejected() {
        let (revenue, investments, ledger) = create_test_services();
        invest(&investments, "alice", 10.0);

        assert!(matches!(
            revenue.distribute("vid-1", "mallory", 100.0),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(ledger.get_all_transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_non_positive_revenue_rejected() {
        let (revenue, _investments, _ledger) = create_test_services();
        assert!(revenue.distribute("vid-1", "maya", 0.0).is_err());
        assert!(revenue.distribute("vid-1", "maya", f64::INFINITY).is_err());
    }
}
