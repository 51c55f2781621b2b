//! Atomic balance store
//!
//! The only shared mutable resource in the system. Every mutation is a
//! single atomic primitive: `try_debit` performs its sufficiency check and
//! the decrement in one indivisible step (there is no separate
//! read-then-write anywhere), and `atomic_pair` applies a debit and a
//! credit as one all-or-nothing unit so a transfer or conversion can never
//! create or destroy value by half-applying.
//!
//! The in-memory implementation keeps all rows behind one async mutex;
//! acquisition is bounded by a timeout surfaced as `StoreUnavailable`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;

use ledger_types::errors::LedgerError;
use ledger_types::ids::{CurrencyId, WalletAddress};

use crate::config::EngineConfig;

/// One leg of a paired mutation.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub wallet: WalletAddress,
    pub currency: CurrencyId,
    pub amount: Decimal,
}

impl Mutation {
    pub fn new(wallet: WalletAddress, currency: CurrencyId, amount: Decimal) -> Self {
        Self {
            wallet,
            currency,
            amount,
        }
    }
}

/// Transactional (wallet, currency) -> amount mapping.
///
/// Implementations must provide per-key serializability: two concurrent
/// operations on the same key can never both pass a sufficiency check that
/// only one of them should.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current amount for a balance row.
    async fn read(&self, wallet: &WalletAddress, currency: CurrencyId)
        -> Result<Decimal, LedgerError>;

    /// Atomically check `current >= amount` and decrement. Returns the new
    /// amount, or `InsufficientBalance` leaving the row untouched.
    async fn try_debit(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError>;

    /// Atomically increment. Never fails on balance grounds; only a missing
    /// row is an error.
    async fn credit(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError>;

    /// Apply a debit and a credit as one all-or-nothing unit. Both legs are
    /// validated before either is applied; any failure leaves every row
    /// unchanged. Returns the two new amounts.
    async fn atomic_pair(
        &self,
        debit: Mutation,
        credit: Mutation,
    ) -> Result<(Decimal, Decimal), LedgerError>;

    /// Insert zero rows for a newly provisioned wallet, one per currency.
    async fn provision(
        &self,
        wallet: &WalletAddress,
        currencies: &[CurrencyId],
    ) -> Result<(), LedgerError>;

    /// Snapshot of all rows for a wallet, sorted by currency id.
    async fn balances_of(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<(CurrencyId, Decimal)>, LedgerError>;
}

type Rows = HashMap<WalletAddress, HashMap<CurrencyId, Decimal>>;

/// In-memory balance store.
///
/// One mutex over the whole map keeps every primitive trivially
/// serializable, including the two-legged `atomic_pair`.
#[derive(Debug)]
pub struct InMemoryBalanceStore {
    rows: Mutex<Rows>,
    lock_timeout: Duration,
}

impl InMemoryBalanceStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            lock_timeout: config.store_timeout,
        }
    }

    /// Acquire the row lock within the configured bound.
    async fn lock(&self) -> Result<MutexGuard<'_, Rows>, LedgerError> {
        timeout(self.lock_timeout, self.rows.lock())
            .await
            .map_err(|_| LedgerError::StoreUnavailable {
                reason: "timed out acquiring balance lock".to_string(),
            })
    }
}

/// Row lookup against the locked map. A missing wallet and a missing
/// currency row are distinct failures.
fn row(rows: &Rows, wallet: &WalletAddress, currency: CurrencyId) -> Result<Decimal, LedgerError> {
    let wallet_rows = rows.get(wallet).ok_or_else(|| LedgerError::WalletNotFound {
        address: wallet.to_string(),
    })?;
    wallet_rows
        .get(&currency)
        .copied()
        .ok_or(LedgerError::CurrencyNotFound {
            id: currency.value(),
        })
}

fn apply(
    rows: &mut Rows,
    wallet: &WalletAddress,
    currency: CurrencyId,
    new_amount: Decimal,
) -> Decimal {
    // Row existence was validated by `row` under the same lock.
    if let Some(wallet_rows) = rows.get_mut(wallet) {
        wallet_rows.insert(currency, new_amount);
    }
    new_amount
}

fn checked_debit(current: Decimal, amount: Decimal, currency: CurrencyId) -> Result<Decimal, LedgerError> {
    if current < amount {
        return Err(LedgerError::InsufficientBalance {
            currency: currency.value(),
            required: amount.normalize().to_string(),
            available: current.normalize().to_string(),
        });
    }
    current
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::StoreUnavailable {
            reason: "balance arithmetic overflow".to_string(),
        })
}

fn checked_credit(current: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    current
        .checked_add(amount)
        .ok_or_else(|| LedgerError::StoreUnavailable {
            reason: "balance arithmetic overflow".to_string(),
        })
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn read(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
    ) -> Result<Decimal, LedgerError> {
        let rows = self.lock().await?;
        row(&rows, wallet, currency)
    }

    async fn try_debit(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let mut rows = self.lock().await?;
        let current = row(&rows, wallet, currency)?;
        let new_amount = checked_debit(current, amount, currency)?;
        Ok(apply(&mut rows, wallet, currency, new_amount))
    }

    async fn credit(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let mut rows = self.lock().await?;
        let current = row(&rows, wallet, currency)?;
        let new_amount = checked_credit(current, amount)?;
        Ok(apply(&mut rows, wallet, currency, new_amount))
    }

    async fn atomic_pair(
        &self,
        debit: Mutation,
        credit: Mutation,
    ) -> Result<(Decimal, Decimal), LedgerError> {
        let mut rows = self.lock().await?;

        // Validate both legs and compute both new amounts before applying
        // either, so no failure can leave a half-applied pair.
        let debit_current = row(&rows, &debit.wallet, debit.currency)?;
        let new_debit = checked_debit(debit_current, debit.amount, debit.currency)?;
        let same_row = debit.wallet == credit.wallet && debit.currency == credit.currency;
        let credit_current = if same_row {
            new_debit
        } else {
            row(&rows, &credit.wallet, credit.currency)?
        };
        let new_credit = checked_credit(credit_current, credit.amount)?;

        apply(&mut rows, &debit.wallet, debit.currency, new_debit);
        let new_credit = apply(&mut rows, &credit.wallet, credit.currency, new_credit);

        Ok((new_debit, new_credit))
    }

    async fn provision(
        &self,
        wallet: &WalletAddress,
        currencies: &[CurrencyId],
    ) -> Result<(), LedgerError> {
        let mut rows = self.lock().await?;
        let wallet_rows = rows.entry(wallet.clone()).or_default();
        for currency in currencies {
            wallet_rows.entry(*currency).or_insert(Decimal::ZERO);
        }
        Ok(())
    }

    async fn balances_of(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<(CurrencyId, Decimal)>, LedgerError> {
        let rows = self.lock().await?;
        let wallet_rows = rows.get(wallet).ok_or_else(|| LedgerError::WalletNotFound {
            address: wallet.to_string(),
        })?;
        let mut balances: Vec<(CurrencyId, Decimal)> =
            wallet_rows.iter().map(|(id, amount)| (*id, *amount)).collect();
        balances.sort_by_key(|(id, _)| *id);
        Ok(balances)
    }
}
