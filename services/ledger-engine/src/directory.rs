//! Wallet and currency registry
//!
//! Owns the wallet records (address, status, secret digest) and the
//! immutable currency reference data. Balances live in the balance store;
//! the directory never touches them, so neither side references the other.

use chrono::Utc;
use dashmap::DashMap;
use ledger_types::currency::Currency;
use ledger_types::errors::LedgerError;
use ledger_types::ids::{CurrencyId, WalletAddress};
use ledger_types::wallet::{Wallet, WalletStatus};
use rand::RngCore;

use crate::auth::secret_digest;
use crate::config::EngineConfig;

/// A wallet record together with the digest of its secret.
#[derive(Debug, Clone)]
struct WalletEntry {
    wallet: Wallet,
    secret_digest: String,
}

/// Credentials handed back exactly once at provisioning.
///
/// The plain secret is never stored; only its digest survives in the
/// directory.
#[derive(Debug, Clone)]
pub struct ProvisionedWallet {
    pub wallet: Wallet,
    pub secret: String,
}

/// In-memory registry of wallets and currencies.
#[derive(Debug)]
pub struct WalletDirectory {
    wallets: DashMap<WalletAddress, WalletEntry>,
    currencies: DashMap<CurrencyId, Currency>,
    address_bytes: usize,
    secret_bytes: usize,
}

impl WalletDirectory {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            wallets: DashMap::new(),
            currencies: DashMap::new(),
            address_bytes: config.address_bytes,
            secret_bytes: config.secret_bytes,
        }
    }

    // ───────────────────────── Wallets ─────────────────────────

    /// Provision a new active wallet.
    ///
    /// Generates a random address and secret, stores the secret's digest,
    /// and returns the plain secret to the caller exactly once.
    pub fn create_wallet(&self) -> ProvisionedWallet {
        let address = WalletAddress::new(random_hex(self.address_bytes));
        let secret = random_hex(self.secret_bytes);
        let wallet = Wallet {
            address: address.clone(),
            created_at: Utc::now().timestamp_millis(),
            status: WalletStatus::Active,
        };
        self.wallets.insert(
            address,
            WalletEntry {
                wallet: wallet.clone(),
                secret_digest: secret_digest(&secret),
            },
        );
        tracing::info!(address = %wallet.address, "wallet provisioned");
        ProvisionedWallet { wallet, secret }
    }

    /// Look up a wallet record.
    pub fn wallet(&self, address: &WalletAddress) -> Result<Wallet, LedgerError> {
        self.wallets
            .get(address)
            .map(|entry| entry.wallet.clone())
            .ok_or_else(|| LedgerError::WalletNotFound {
                address: address.to_string(),
            })
    }

    /// Look up a wallet and require it to be active.
    pub fn active_wallet(&self, address: &WalletAddress) -> Result<Wallet, LedgerError> {
        let wallet = self.wallet(address)?;
        if !wallet.is_active() {
            return Err(LedgerError::WalletBlocked {
                address: address.to_string(),
            });
        }
        Ok(wallet)
    }

    /// Update a wallet's status, returning the updated record.
    pub fn set_status(
        &self,
        address: &WalletAddress,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError> {
        let mut entry = self
            .wallets
            .get_mut(address)
            .ok_or_else(|| LedgerError::WalletNotFound {
                address: address.to_string(),
            })?;
        entry.wallet.status = status;
        Ok(entry.wallet.clone())
    }

    /// Snapshot of all wallet records.
    pub fn list_wallets(&self) -> Vec<Wallet> {
        self.wallets
            .iter()
            .map(|entry| entry.wallet.clone())
            .collect()
    }

    /// Stored secret digest for a wallet, if the wallet exists.
    pub(crate) fn stored_digest(&self, address: &WalletAddress) -> Option<String> {
        self.wallets
            .get(address)
            .map(|entry| entry.secret_digest.clone())
    }

    // ───────────────────────── Currencies ─────────────────────────

    /// Register a supported currency. Reference data, immutable once set.
    pub fn register_currency(&self, currency: Currency) {
        self.currencies.insert(currency.id, currency);
    }

    /// Resolve a currency by id.
    pub fn currency(&self, id: CurrencyId) -> Result<Currency, LedgerError> {
        self.currencies
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or(LedgerError::CurrencyNotFound { id: id.value() })
    }

    /// All registered currency ids, for balance provisioning.
    pub fn currency_ids(&self) -> Vec<CurrencyId> {
        let mut ids: Vec<CurrencyId> = self.currencies.iter().map(|c| *c.key()).collect();
        ids.sort();
        ids
    }
}

/// The default supported currency set.
pub fn default_currencies() -> Vec<Currency> {
    vec![
        Currency::new(1u32, "BTC", "Bitcoin"),
        Currency::new(2u32, "ETH", "Ethereum"),
        Currency::new(3u32, "USDT", "Tether"),
        Currency::new(4u32, "SOL", "Solana"),
        Currency::new(5u32, "BRL", "Brazilian Real"),
    ]
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
