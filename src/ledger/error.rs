//! Ledger error taxonomy.
//!
//! Every variant propagates unchanged to the caller; the ledger never retries
//! and never swallows a failure.

use std::io;

#[derive(Debug)]
pub enum LedgerError {
    /// The backend declares the capability but does not provide it yet.
    NotImplemented {
        backend: &'static str,
        capability: &'static str,
    },
    /// The storage medium could not be read or written.
    Io(io::Error),
    /// The storage medium holds something that is not a record array.
    CorruptData(String),
    /// A record with this `txId` is already stored.
    DuplicateIdentity(String),
    /// The payload collides with a ledger-assigned field or is malformed.
    InvalidPayload(String),
}

impl LedgerError {
    pub fn not_implemented(backend: &'static str, capability: &'static str) -> Self {
        Self::NotImplemented {
            backend,
            capability,
        }
    }

    /// Stable machine-readable name, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotImplemented { .. } => "not_implemented",
            Self::Io(_) => "io_error",
            Self::CorruptData(_) => "corrupt_data",
            Self::DuplicateIdentity(_) => "duplicate_identity",
            Self::InvalidPayload(_) => "invalid_payload",
        }
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotImplemented {
                backend,
                capability,
            } => write!(f, "{} ledger does not implement {}", backend, capability),
            Self::Io(e) => write!(f, "Ledger I/O error: {}", e),
            Self::CorruptData(msg) => write!(f, "Ledger data is corrupt: {}", msg),
            Self::DuplicateIdentity(id) => write!(f, "Transaction already recorded: {}", id),
            Self::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LedgerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let err: LedgerError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.kind(), "io_error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_names_backend_and_capability() {
        let err = LedgerError::not_implemented("distributed", "record_transaction");
        assert_eq!(
            err.to_string(),
            "distributed ledger does not implement record_transaction"
        );
    }
}
