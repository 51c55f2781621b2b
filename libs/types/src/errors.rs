//! Error taxonomy for the wallet ledger engine
//!
//! Every failure is surfaced to the orchestrator's caller verbatim; nothing
//! is retried or downgraded inside the core. All kinds are recoverable from
//! the caller's perspective except `StoreUnavailable`, which means the
//! backing store itself is unreachable for that request.

use thiserror::Error;

/// Top-level ledger error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Wallet not found: {address}")]
    WalletNotFound { address: String },

    #[error("Wallet is blocked: {address}")]
    WalletBlocked { address: String },

    #[error("Currency not found: {id}")]
    CurrencyNotFound { id: u32 },

    #[error("Unauthorized: secret does not match wallet")]
    Unauthorized,

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient balance for currency {currency}: required {required}, available {available}")]
    InsufficientBalance {
        currency: u32,
        required: String,
        available: String,
    },

    #[error("Exchange rate unavailable: {reason}")]
    ExchangeUnavailable { reason: String },

    #[error("Balance store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl LedgerError {
    /// True for the one failure kind that indicates a dead dependency
    /// rather than a rejected request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable { .. })
    }
}
