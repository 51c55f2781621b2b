//! Engine configuration
//!
//! Every tunable has a default usable in tests; `from_env` applies
//! environment overrides for deployments.

use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

fn default_fee_rate() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

/// Configuration for the ledger engine and its collaborators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fraction of the gross amount charged on withdrawal,
    /// conversion-destination, and transfer.
    pub fee_rate: Decimal,
    /// Smallest storable unit: amounts are kept at this many decimal places.
    pub amount_scale: u32,
    /// Bound on waiting for the balance store's lock.
    pub store_timeout: Duration,
    /// Base URL of the exchange-rate source.
    pub rate_api_base: String,
    /// Bound on the exchange-rate HTTP round trip.
    pub rate_timeout: Duration,
    /// Byte length of generated wallet addresses.
    pub address_bytes: usize,
    /// Byte length of generated wallet secrets.
    pub secret_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate: default_fee_rate(),
            amount_scale: 8,
            store_timeout: Duration::from_secs(2),
            rate_api_base: "https://api.coinbase.com".to_string(),
            rate_timeout: Duration::from_secs(10),
            address_bytes: 16,
            secret_bytes: 32,
        }
    }
}

impl EngineConfig {
    /// Defaults with environment overrides applied.
    ///
    /// Recognized variables: `LEDGER_FEE_RATE`, `LEDGER_AMOUNT_SCALE`,
    /// `LEDGER_STORE_TIMEOUT_MS`, `LEDGER_RATE_API_BASE`,
    /// `LEDGER_RATE_TIMEOUT_MS`, `LEDGER_ADDRESS_BYTES`,
    /// `LEDGER_SECRET_BYTES`. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fee_rate: env_parse("LEDGER_FEE_RATE", defaults.fee_rate),
            amount_scale: env_parse("LEDGER_AMOUNT_SCALE", defaults.amount_scale),
            store_timeout: Duration::from_millis(env_parse(
                "LEDGER_STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )),
            rate_api_base: env::var("LEDGER_RATE_API_BASE").unwrap_or(defaults.rate_api_base),
            rate_timeout: Duration::from_millis(env_parse(
                "LEDGER_RATE_TIMEOUT_MS",
                defaults.rate_timeout.as_millis() as u64,
            )),
            address_bytes: env_parse("LEDGER_ADDRESS_BYTES", defaults.address_bytes),
            secret_bytes: env_parse("LEDGER_SECRET_BYTES", defaults.secret_bytes),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.fee_rate, Decimal::new(2, 2));
        assert_eq!(cfg.amount_scale, 8);
        assert_eq!(cfg.address_bytes, 16);
        assert_eq!(cfg.secret_bytes, 32);
    }

    #[test]
    fn test_env_override() {
        env::set_var("LEDGER_FEE_RATE", "0.05");
        env::set_var("LEDGER_ADDRESS_BYTES", "20");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.fee_rate, Decimal::new(5, 2));
        assert_eq!(cfg.address_bytes, 20);
        env::remove_var("LEDGER_FEE_RATE");
        env::remove_var("LEDGER_ADDRESS_BYTES");
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        env::set_var("LEDGER_AMOUNT_SCALE", "not-a-number");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.amount_scale, 8);
        env::remove_var("LEDGER_AMOUNT_SCALE");
    }
}
