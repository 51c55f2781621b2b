//! Exchange-rate providers
//!
//! The orchestrator fetches the spot rate strictly before any balance
//! mutation and never while a store lock is held. A failed lookup —
//! timeout, non-2xx status, malformed payload, missing pair — is
//! `ExchangeUnavailable`; there is no stale or zero fallback.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;

use ledger_types::errors::LedgerError;

use crate::config::EngineConfig;

/// Spot-rate lookup between two currency codes.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Rate such that `dest_amount = source_amount * rate`.
    async fn rate(&self, source_code: &str, dest_code: &str) -> Result<Decimal, LedgerError>;
}

// ───────────────────────── Coinbase-backed provider ─────────────────────────

#[derive(Debug, Deserialize)]
struct RatesEnvelope {
    data: RatesData,
}

#[derive(Debug, Deserialize)]
struct RatesData {
    #[allow(dead_code)]
    currency: String,
    /// Rate table keyed by destination code; values are decimal strings.
    rates: HashMap<String, String>,
}

/// Rate provider backed by the Coinbase public exchange-rates endpoint.
pub struct CoinbaseRates {
    client: reqwest::Client,
    base_url: String,
}

impl CoinbaseRates {
    /// Build the HTTP client. The configured request timeout bounds every
    /// rate lookup; there is no untimed fallback client.
    pub fn new(config: &EngineConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(config.rate_timeout)
            .build()
            .map_err(|e| LedgerError::ExchangeUnavailable {
                reason: format!("rate client construction failed: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.rate_api_base.clone(),
        })
    }
}

#[async_trait]
impl RateProvider for CoinbaseRates {
    async fn rate(&self, source_code: &str, dest_code: &str) -> Result<Decimal, LedgerError> {
        let url = format!(
            "{}/v2/exchange-rates?currency={}",
            self.base_url, source_code
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::ExchangeUnavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LedgerError::ExchangeUnavailable {
                reason: format!("rate source returned status {}", response.status()),
            });
        }

        let envelope: RatesEnvelope =
            response
                .json()
                .await
                .map_err(|e| LedgerError::ExchangeUnavailable {
                    reason: format!("malformed rate payload: {e}"),
                })?;

        extract_rate(&envelope, dest_code)
    }
}

fn extract_rate(envelope: &RatesEnvelope, dest_code: &str) -> Result<Decimal, LedgerError> {
    let raw = envelope
        .data
        .rates
        .get(dest_code)
        .ok_or_else(|| LedgerError::ExchangeUnavailable {
            reason: format!("no rate quoted for {dest_code}"),
        })?;
    let rate: Decimal = raw.parse().map_err(|_| LedgerError::ExchangeUnavailable {
        reason: format!("unparseable rate for {dest_code}: {raw}"),
    })?;
    if rate <= Decimal::ZERO {
        return Err(LedgerError::ExchangeUnavailable {
            reason: format!("non-positive rate quoted for {dest_code}"),
        });
    }
    Ok(rate)
}

// ───────────────────────── Fixed-table provider ─────────────────────────

/// In-memory rate table for tests and offline runs.
#[derive(Debug, Default)]
pub struct FixedRates {
    table: RwLock<HashMap<(String, String), Decimal>>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate for a (source, dest) pair.
    pub fn set(&self, source_code: &str, dest_code: &str, rate: Decimal) {
        if let Ok(mut table) = self.table.write() {
            table.insert((source_code.to_string(), dest_code.to_string()), rate);
        }
    }
}

#[async_trait]
impl RateProvider for FixedRates {
    async fn rate(&self, source_code: &str, dest_code: &str) -> Result<Decimal, LedgerError> {
        let table = self
            .table
            .read()
            .map_err(|_| LedgerError::ExchangeUnavailable {
                reason: "rate table poisoned".to_string(),
            })?;
        table
            .get(&(source_code.to_string(), dest_code.to_string()))
            .copied()
            .ok_or_else(|| LedgerError::ExchangeUnavailable {
                reason: format!("no fixed rate for {source_code}->{dest_code}"),
            })
    }
}
