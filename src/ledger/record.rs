//! Transaction Record
//!
//! A fixed envelope (`txId`, `timestamp`, optional `hash`) around an opaque
//! caller payload. On disk and over the wire the payload fields sit at the top
//! level of the record object, next to the envelope fields.

use crate::ledger::error::LedgerError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Caller-supplied fields, opaque to the ledger.
pub type Payload = Map<String, Value>;

pub const TX_ID_FIELD: &str = "txId";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const HASH_FIELD: &str = "hash";
pub const TYPE_FIELD: &str = "type";

/// Transaction kinds used by the platform's domain services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    VideoUpload,
    Investment,
    Distribution,
    StorageProof,
    InterestPayout,
    Withdrawal,
    PlatformFee,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::VideoUpload => "VIDEO_UPLOAD",
            TransactionType::Investment => "INVESTMENT",
            TransactionType::Distribution => "DISTRIBUTION",
            TransactionType::StorageProof => "STORAGE_PROOF",
            TransactionType::InterestPayout => "INTEREST_PAYOUT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::PlatformFee => "PLATFORM_FEE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "VIDEO_UPLOAD" => Some(TransactionType::VideoUpload),
            "INVESTMENT" => Some(TransactionType::Investment),
            "DISTRIBUTION" => Some(TransactionType::Distribution),
            "STORAGE_PROOF" => Some(TransactionType::StorageProof),
            "INTEREST_PAYOUT" => Some(TransactionType::InterestPayout),
            "WITHDRAWAL" => Some(TransactionType::Withdrawal),
            "PLATFORM_FEE" => Some(TransactionType::PlatformFee),
            _ => None,
        }
    }
}

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl TransactionRecord {
    /// The `type` payload field, if it names a known transaction kind.
    pub fn tx_type(&self) -> Option<TransactionType> {
        self.payload
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(TransactionType::from_str)
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    /// SHA-256 over the canonical JSON of the record without its `hash` field.
    ///
    /// `serde_json::Map` keeps keys sorted, so the encoding is deterministic.
    pub fn compute_hash(&self) -> String {
        let mut canonical = self.payload.clone();
        canonical.insert(TX_ID_FIELD.to_string(), Value::String(self.tx_id.clone()));
        canonical.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        let encoded = Value::Object(canonical).to_string();
        hex::encode(Sha256::digest(encoded.as_bytes()))
    }

    /// `None` for unhashed records, otherwise whether the stored hash matches.
    pub fn verify_hash(&self) -> Option<bool> {
        self.hash.as_ref().map(|stored| *stored == self.compute_hash())
    }
}

/// Builds the next record for `history`.
///
/// A non-empty string `txId` in the payload becomes the record identity;
/// otherwise a UUID v4 is assigned. `timestamp` never goes backwards relative
/// to the last stored record.
pub fn build_record(
    history: &[TransactionRecord],
    mut payload: Payload,
    hash_records: bool,
) -> Result<TransactionRecord, LedgerError> {
    for reserved in [TIMESTAMP_FIELD, HASH_FIELD] {
        if payload.contains_key(reserved) {
            return Err(LedgerError::InvalidPayload(format!(
                "`{}` is assigned by the ledger",
                reserved
            )));
        }
    }

    let tx_id = match payload.remove(TX_ID_FIELD) {
        None => Uuid::new_v4().to_string(),
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(_) => {
            return Err(LedgerError::InvalidPayload(
                "`txId` must be a non-empty string".to_string(),
            ))
        }
    };

    if history.iter().any(|r| r.tx_id == tx_id) {
        return Err(LedgerError::DuplicateIdentity(tx_id));
    }

    let now = Utc::now().trunc_subsecs(3);
    let timestamp = match history.last() {
        Some(last) if last.timestamp > now => last.timestamp,
        _ => now,
    };

    let mut record = TransactionRecord {
        tx_id,
        timestamp,
        hash: None,
        payload,
    };
    if hash_records {
        record.hash = Some(record.compute_hash());
    }
    Ok(record)
}
