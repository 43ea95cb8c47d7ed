//! Append-only Transaction Ledger
//!
//! Callers submit a payload and get back a copy of what was stored; nothing
//! outside a backend ever holds a mutable reference to stored records, and no
//! operation mutates or removes a record once appended.
//!
//! Backends:
//! - [`FileLedger`]: a single JSON array file, rewritten whole on every append
//! - [`MemoryLedger`]: process-local, for tests and throwaway deployments

pub mod error;
pub mod file;
pub mod memory;
pub mod record;

pub use error::LedgerError;
pub use file::FileLedger;
pub use memory::MemoryLedger;
pub use record::{Payload, TransactionRecord, TransactionType};

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Capability contract every ledger backend satisfies.
///
/// # Invariants
///
/// - Records are immutable once appended.
/// - `txId` is unique across the whole ledger.
/// - `get_all_transactions` returns records in append order, and every call
///   returns a fresh snapshot of the backing store.
pub trait Ledger: Send + Sync {
    /// Appends `payload` and returns the stored record, including the
    /// ledger-assigned `txId` (unless supplied) and `timestamp`.
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentity` if the payload's `txId` is already stored.
    /// - `InvalidPayload` if the payload carries a ledger-assigned field.
    /// - `Io` / `CorruptData` from the backing store.
    fn record_transaction(&self, payload: Payload) -> Result<TransactionRecord, LedgerError>;

    /// Every stored record, in append order.
    fn get_all_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError>;

    fn find_transaction(&self, tx_id: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self
            .get_all_transactions()?
            .into_iter()
            .find(|r| r.tx_id == tx_id))
    }

    fn transactions_of_type(
        &self,
        tx_type: TransactionType,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .get_all_transactions()?
            .into_iter()
            .filter(|r| r.tx_type() == Some(tx_type))
            .collect())
    }

    /// Recomputes the hash of every hashed record.
    fn verify_integrity(&self) -> Result<IntegrityReport, LedgerError> {
        let records = self.get_all_transactions()?;
        let mut report = IntegrityReport {
            total_records: records.len(),
            ..Default::default()
        };

        for record in &records {
            match record.verify_hash() {
                Some(true) => report.hashed_records += 1,
                Some(false) => {
                    report.hashed_records += 1;
                    warn!(tx_id = %record.tx_id, "Ledger record hash mismatch");
                    report.mismatched.push(record.tx_id.clone());
                }
                None => {}
            }
        }

        report.valid = report.mismatched.is_empty();
        Ok(report)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub total_records: usize,
    pub hashed_records: usize,
    pub mismatched: Vec<String>,
    pub valid: bool,
}

/// Which backend `open_ledger` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackendKind {
    File,
    Memory,
    /// Reserved for a replicated backend; not built yet.
    Distributed,
}

impl LedgerBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerBackendKind::File => "file",
            LedgerBackendKind::Memory => "memory",
            LedgerBackendKind::Distributed => "distributed",
        }
    }
}

impl std::str::FromStr for LedgerBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(LedgerBackendKind::File),
            "memory" => Ok(LedgerBackendKind::Memory),
            "distributed" => Ok(LedgerBackendKind::Distributed),
            other => Err(format!(
                "unknown ledger backend `{}` (expected file, memory or distributed)",
                other
            )),
        }
    }
}

/// Opens the configured backend behind the shared trait object.
pub fn open_ledger(
    kind: LedgerBackendKind,
    path: PathBuf,
    hash_records: bool,
) -> Result<Arc<dyn Ledger>, LedgerError> {
    let ledger: Arc<dyn Ledger> = match kind {
        LedgerBackendKind::File => {
            info!(path = %path.display(), hash_records, "Opening file ledger");
            Arc::new(FileLedger::new(path).with_hashing(hash_records))
        }
        LedgerBackendKind::Memory => {
            info!(hash_records, "Opening in-memory ledger");
            Arc::new(MemoryLedger::new().with_hashing(hash_records))
        }
        LedgerBackendKind::Distributed => {
            return Err(LedgerError::not_implemented(
                LedgerBackendKind::Distributed.as_str(),
                "open",
            ))
        }
    };
    Ok(ledger)
}
