//! Investment Recording
//!
//! A viewer invests currency in a creator's video. The investment is recorded
//! on the ledger; per-video totals are derived by replaying the ledger, so
//! there is no second copy of investment state to drift out of sync.

use crate::ledger::{Ledger, Payload, TransactionRecord, TransactionType};
use crate::services::{require_non_empty, require_positive, round_amount, ServiceError, CURRENCY};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRequest {
    pub video_id: String,
    pub from_user: String,
    pub to_creator: String,
    pub amount: f64,
    /// Client-chosen identity; makes a retried submission detectable.
    #[serde(default)]
    pub tx_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoInvestmentSummary {
    pub video_id: String,
    pub creator: Option<String>,
    pub total_invested: f64,
    pub investment_count: usize,
    /// Investor username -> total invested in this video.
    pub investors: BTreeMap<String, f64>,
}

#[derive(Clone)]
pub struct InvestmentService {
    ledger: Arc<dyn Ledger>,
}

impl InvestmentService {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub fn record_investment(
        &self,
        request: &InvestmentRequest,
    ) -> Result<TransactionRecord, ServiceError> {
        let video_id = require_non_empty("videoId", &request.video_id)?;
        let from_user = require_non_empty("fromUser", &request.from_user)?;
        let to_creator = require_non_empty("toCreator", &request.to_creator)?;
        let amount = require_positive("amount", round_amount(request.amount))?;

        if from_user == to_creator {
            return Err(ServiceError::Validation(
                "creators cannot invest in their own video".to_string(),
            ));
        }

        // The first investment fixes the video's creator
        if let Some(owner) = self.video_summary(&video_id)?.creator {
            if owner != to_creator {
                return Err(ServiceError::Validation(format!(
                    "video {} belongs to {}, not {}",
                    video_id, owner, to_creator
                )));
            }
        }

        let mut payload = Payload::new();
        if let Some(tx_id) = &request.tx_id {
            payload.insert("txId".to_string(), json!(tx_id));
        }
        payload.insert("videoId".to_string(), json!(video_id));
        payload.insert("fromUser".to_string(), json!(from_user));
        payload.insert("toCreator".to_string(), json!(to_creator));
        payload.insert("amount".to_string(), json!(amount));
        payload.insert("currency".to_string(), json!(CURRENCY));
        payload.insert(
            "type".to_string(),
            json!(TransactionType::Investment.as_str()),
        );

        let record = self.ledger.record_transaction(payload)?;

        info!(
            tx_id = %record.tx_id,
            video_id = %video_id,
            investor = %from_user,
            amount,
            "Investment recorded"
        );

        Ok(record)
    }

    pub fn video_summary(&self, video_id: &str) -> Result<VideoInvestmentSummary, ServiceError> {
        let video_id = require_non_empty("videoId", video_id)?;

        let mut summary = VideoInvestmentSummary {
            video_id: video_id.clone(),
            creator: None,
            total_invested: 0.0,
            investment_count: 0,
            investors: BTreeMap::new(),
        };

        let investments = self
            .ledger
            .transactions_of_type(TransactionType::Investment)?;

        for record in investments
            .iter()
            .filter(|r| r.payload_str("videoId") == Some(video_id.as_str()))
        {
            let (Some(investor), Some(amount)) =
                (record.payload_str("fromUser"), record.payload_f64("amount"))
            else {
                continue;
            };

            if summary.creator.is_none() {
                summary.creator = record.payload_str("toCreator").map(str::to_string);
            }
            summary.investment_count += 1;
            summary.total_invested += amount;
            *summary
                .investors
                .entry(investor.to_string())
                .or_insert(0.0) += amount;
        }

        summary.total_invested = round_amount(summary.total_invested);
        for total in summary.investors.values_mut() {
            *total = round_amount(*total);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerError, MemoryLedger};

    fn create_test_service() -> (InvestmentService, Arc<dyn Ledger>) {
        let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
        (InvestmentService::new(ledger.clone()), ledger)
    }

    fn request(video: &str, investor: &str, amount: f64) -> InvestmentRequest {
        InvestmentRequest {
            video_id: video.to_string(),
            from_user: investor.to_string(),
            to_creator: "creator1".to_string(),
            amount,
            tx_id: None,
        }
    }

    #[test]
    fn test_investment_recorded_with_payload_shape() {
        let (service, ledger) = create_test_service();

        let record = service.record_investment(&request("vid-1", "alice", 100.0)).unwrap();
        assert_eq!(record.tx_type(), Some(TransactionType::Investment));
        assert_eq!(record.payload_str("videoId"), Some("vid-1"));
        assert_eq!(record.payload_str("fromUser"), Some("alice"));
        assert_eq!(record.payload_str("toCreator"), Some("creator1"));
        assert_eq!(record.payload_f64("amount"), Some(100.0));
        assert_eq!(record.payload_str("currency"), Some(CURRENCY));

        assert_eq!(ledger.get_all_transactions().unwrap(), vec![record]);
    }

    #[test]
    fn test_invalid_requests_never_reach_ledger() {
        let (service, ledger) = create_test_service();

        assert!(matches!(
            service.record_investment(&request("vid-1", "alice", 0.0)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.record_investment(&request("", "alice", 5.0)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.record_investment(&request("vid-1", "creator1", 5.0)),
            Err(ServiceError::Validation(_))
        ));

        assert!(ledger.get_all_transactions().unwrap().is_empty());
    }

    #[test]
    fn test_amount_that_rounds_to_zero_is_rejected() {
        let (service, ledger) = create_test_service();

        assert!(matches!(
            service.record_investment(&request("vid-1", "alice", 1e-9)),
            Err(ServiceError::Validation(_))
        ));
        assert!(ledger.get_all_transactions().unwrap().is_empty());

        let record = service
            .record_investment(&request("vid-1", "alice", 0.123456789))
            .unwrap();
        assert_eq!(record.payload_f64("amount"), Some(0.12345679));
    }

    #[test]
    fn test_investment_to_another_creator_is_rejected() {
        let (service, ledger) = create_test_service();
        let mut squatter = request("vid-1", "mallory", 10.0);
        squatter.to_creator = "mallory-alt".to_string();
        service.record_investment(&squatter).unwrap();

        // Later investments must name the creator already on record
        let err = service
            .record_investment(&request("vid-1", "alice", 50.0))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref msg) if msg.contains("mallory-alt")));
        assert_eq!(ledger.get_all_transactions().unwrap().len(), 1);

        // Other videos are unaffected
        assert!(service
            .record_investment(&request("vid-2", "alice", 50.0))
            .is_ok());
    }

    #[test]
    fn test_resubmitted_tx_id_is_rejected() {
        let (service, _ledger) = create_test_service();
        let mut req = request("vid-1", "alice", 10.0);
        req.tx_id = Some("client-42".to_string());

        let first = service.record_investment(&req).unwrap();
        assert_eq!(first.tx_id, "client-42");

        assert!(matches!(
            service.record_investment(&req),
            Err(ServiceError::Ledger(LedgerError::DuplicateIdentity(_)))
        ));
    }

    #[test]
    fn test_video_summary_aggregates_per_investor() {
        let (service, _ledger) = create_test_service();
        service.record_investment(&request("vid-1", "alice", 100.0)).unwrap();
        service.record_investment(&request("vid-1", "bob", 50.0)).unwrap();
        service.record_investment(&request("vid-1", "alice", 25.5)).unwrap();
        service.record_investment(&request("vid-2", "carol", 999.0)).unwrap();

        let summary = service.video_summary("vid-1").unwrap();
        assert_eq!(summary.investment_count, 3);
        assert_eq!(summary.total_invested, 175.5);
        assert_eq!(summary.creator.as_deref(), Some("creator1"));
        assert_eq!(summary.investors.get("alice"), Some(&125.5));
        assert_eq!(summary.investors.get("bob"), Some(&50.0));
        assert!(!summary.investors.contains_key("carol"));
    }

    #[test]
    fn test_summary_for_unknown_video_is_empty() {
        let (service, _ledger) = create_test_service();
        let summary = service.video_summary("nothing-here").unwrap();
        assert_eq!(summary.investment_count, 0);
        assert_eq!(summary.total_invested, 0.0);
        assert!(summary.creator.is_none());
    }
}
