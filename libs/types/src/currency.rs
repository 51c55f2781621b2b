//! Currency reference data
//!
//! Currencies are immutable rows keyed by [`CurrencyId`]; the engine only
//! ever looks them up, never mutates them.

use crate::ids::CurrencyId;
use serde::{Deserialize, Serialize};

/// A supported currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    /// Short code used by the exchange-rate source, e.g. "BTC"
    pub code: String,
    /// Human-readable display name
    pub name: String,
}

impl Currency {
    pub fn new(id: impl Into<CurrencyId>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
        }
    }
}
