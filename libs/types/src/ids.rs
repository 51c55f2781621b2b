//! Unique identifier types for ledger entities
//!
//! Ledger record ids use UUID v7 for time-sortable ordering, enabling
//! chronological audit queries. Wallet addresses are opaque hex strings
//! generated at provisioning time; currency ids are small integers into
//! immutable reference data.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque wallet address.
///
/// Globally unique hex string assigned when a wallet is provisioned.
/// The ledger never inspects the contents; it is only a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier for a supported currency.
///
/// Currencies are immutable reference data; an id that resolves to no
/// registered currency is a `CurrencyNotFound` error at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(u32);

impl CurrencyId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CurrencyId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for an audit ledger record
///
/// Uses UUID v7 for time-based sorting, so the append-only record stream
/// can be replayed in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new RecordId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_creation() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2, "RecordIds should be unique");
    }

    #[test]
    fn test_record_id_serialization() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_wallet_address_transparent_serde() {
        let addr = WalletAddress::new("9f2c41d8a7e3");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"9f2c41d8a7e3\"");
    }

    #[test]
    fn test_currency_id_roundtrip() {
        let id = CurrencyId::new(3);
        assert_eq!(id.value(), 3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "3");
        let back: CurrencyId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
