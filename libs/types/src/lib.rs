//! Types library for the wallet ledger engine
//!
//! This library provides the core type definitions shared across the ledger
//! system: identifiers, wallet and currency reference data, the immutable
//! audit record variants, and the error taxonomy.
//!
//! # Modules
//! - `ids`: Unique identifiers (WalletAddress, CurrencyId, RecordId)
//! - `wallet`: Wallet record and status
//! - `currency`: Currency reference data
//! - `record`: Append-only ledger record variants
//! - `errors`: Error taxonomy

pub mod currency;
pub mod errors;
pub mod ids;
pub mod record;
pub mod wallet;

/// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::currency::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::record::*;
    pub use crate::wallet::*;
}
