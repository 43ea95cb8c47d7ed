//! In-memory ledger backend. Same contract as the file backend, nothing
//! survives the process.

use crate::ledger::{
    error::LedgerError,
    record::{build_record, Payload, TransactionRecord},
    Ledger,
};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<TransactionRecord>>,
    hash_records: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hashing(mut self, enabled: bool) -> Self {
        self.hash_records = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for MemoryLedger {
    fn record_transaction(&self, payload: Payload) -> Result<TransactionRecord, LedgerError> {
        let mut records = self.records.lock();
        let record = build_record(&records, payload, self.hash_records)?;
        records.push(record.clone());
        debug!(tx_id = %record.tx_id, records = records.len(), "Appended ledger record");
        Ok(record)
    }

    fn get_all_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.records.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_is_a_copy() {
        let ledger = MemoryLedger::new();
        let p = json!({"amount": 1}).as_object().cloned().unwrap();
        ledger.record_transaction(p.clone()).unwrap();

        let mut snapshot = ledger.get_all_transactions().unwrap();
        snapshot[0].payload.insert("amount".to_string(), json!(1000));
        snapshot.clear();

        let fresh = ledger.get_all_transactions().unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].payload_f64("amount"), Some(1.0));
    }

    #[test]
    fn test_duplicate_rejected_without_growth() {
        let ledger = MemoryLedger::new();
        let p = json!({"txId": "same"}).as_object().cloned().unwrap();
        ledger.record_transaction(p.clone()).unwrap();

        assert!(matches!(
            ledger.record_transaction(p),
            Err(LedgerError::DuplicateIdentity(_))
        ));
        assert_eq!(ledger.len(), 1);
    }
}
