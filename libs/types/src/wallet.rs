//! Wallet record and status
//!
//! A wallet is an account holding one balance per supported currency.
//! Only `Active` wallets may be mutated; a `Blocked` wallet rejects every
//! financial operation before authorization is even attempted.

use crate::ids::WalletAddress;
use serde::{Deserialize, Serialize};

/// Wallet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WalletStatus {
    /// Active and able to transact
    Active,
    /// Blocked; all financial operations are rejected
    Blocked,
}

/// Wallet record as exposed to callers.
///
/// The secret digest used for authorization lives in the directory, not
/// here; this struct is safe to serialize outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: WalletAddress,
    /// Creation time, unix milliseconds
    pub created_at: i64,
    pub status: WalletStatus,
}

impl Wallet {
    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }
}
