//! Flat-file ledger backend.
//!
//! The whole ledger is one JSON array. The file is created lazily (holding
//! `[]`) on first access and never removed afterwards. Every append reads the
//! full array, pushes one record and rewrites the file through a temp file
//! plus rename, so readers see either the previous or the next complete array.
//!
//! Single-writer only: the internal mutex serializes handlers within one
//! process, but two processes sharing a file can still lose appends.

use crate::ledger::{
    error::LedgerError,
    record::{build_record, Payload, TransactionRecord},
    Ledger,
};
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub struct FileLedger {
    path: PathBuf,
    hash_records: bool,
    lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hash_records: false,
            lock: Mutex::new(()),
        }
    }

    /// Attach a SHA-256 hash to every record appended from now on.
    pub fn with_hashing(mut self, enabled: bool) -> Self {
        self.hash_records = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, payload: Payload) -> Result<TransactionRecord, LedgerError> {
        let _guard = self.lock.lock();
        self.ensure_initialized()?;

        let mut records = self.load()?;
        let record = build_record(&records, payload, self.hash_records)?;
        records.push(record.clone());
        self.persist(&records)?;

        debug!(
            tx_id = %record.tx_id,
            records = records.len(),
            "Appended ledger record"
        );
        Ok(record)
    }

    pub fn read_all(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        let _guard = self.lock.lock();
        self.ensure_initialized()?;
        self.load()
    }

    fn ensure_initialized(&self) -> Result<(), LedgerError> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent)?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                file.write_all(b"[]")?;
                file.sync_all()?;
                info!(path = %self.path.display(), "Initialized empty ledger file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| {
            LedgerError::CorruptData(format!("{}: {}", self.path.display(), e))
        })
    }

    fn persist(&self, records: &[TransactionRecord]) -> Result<(), LedgerError> {
        let data = serde_json::to_vec_pretty(records).map_err(io::Error::from)?;

        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl Ledger for FileLedger {
    fn record_transaction(&self, payload: Payload) -> Result<TransactionRecord, LedgerError> {
        self.append(payload)
    }

    fn get_all_transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.read_all()
    }
}
