//! Append-only audit recorder
//!
//! One record per completed financial operation. Records are never mutated
//! or deleted; the orchestrator writes a record if and only if the balance
//! mutation committed.

use async_trait::async_trait;
use std::sync::RwLock;

use ledger_types::errors::LedgerError;
use ledger_types::ids::{RecordId, WalletAddress};
use ledger_types::record::LedgerRecord;

/// Audit-record sink.
///
/// Append never fails for well-formed input in-memory; a store-backed
/// implementation surfaces `StoreUnavailable`, which fails the enclosing
/// operation.
#[async_trait]
pub trait LedgerRecorder: Send + Sync {
    async fn record(&self, entry: LedgerRecord) -> Result<RecordId, LedgerError>;
}

/// In-memory append-only ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<LedgerRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records touching a wallet, in append order.
    pub fn records_for(&self, wallet: &WalletAddress) -> Vec<LedgerRecord> {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|r| r.touches(wallet))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Full record stream, in append order.
    pub fn all(&self) -> Vec<LedgerRecord> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerRecorder for InMemoryLedger {
    async fn record(&self, entry: LedgerRecord) -> Result<RecordId, LedgerError> {
        let record_id = entry.record_id();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::StoreUnavailable {
                reason: "ledger lock poisoned".to_string(),
            })?;
        entries.push(entry);
        Ok(record_id)
    }
}
