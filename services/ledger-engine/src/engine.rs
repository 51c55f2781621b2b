//! Transaction orchestrator
//!
//! Composes the directory, balance store, fee schedule, rate provider, and
//! audit recorder into the four financial operations. Each operation runs
//! validate → authorize (where required) → compute → mutate → record; any
//! failure aborts before a mutation commits, and the only mutating calls
//! are the store's atomic primitives, so no partial state can survive.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use ledger_types::currency::Currency;
use ledger_types::errors::LedgerError;
use ledger_types::ids::{CurrencyId, RecordId, WalletAddress};
use ledger_types::record::{
    ConversionRecord, DepositRecord, LedgerRecord, TransferRecord, WithdrawalRecord,
};

use crate::auth::SecretGuard;
use crate::config::EngineConfig;
use crate::directory::WalletDirectory;
use crate::fee::FeeSchedule;
use crate::rates::RateProvider;
use crate::recorder::LedgerRecorder;
use crate::store::{BalanceStore, Mutation};

/// The wallet ledger engine.
///
/// All collaborators are injected; the engine owns no connection state of
/// its own and is cheap to share across tasks behind an `Arc`.
pub struct LedgerEngine {
    directory: Arc<WalletDirectory>,
    balances: Arc<dyn BalanceStore>,
    ledger: Arc<dyn LedgerRecorder>,
    rates: Arc<dyn RateProvider>,
    guard: SecretGuard,
    fees: FeeSchedule,
}

impl LedgerEngine {
    pub fn new(
        directory: Arc<WalletDirectory>,
        balances: Arc<dyn BalanceStore>,
        ledger: Arc<dyn LedgerRecorder>,
        rates: Arc<dyn RateProvider>,
        config: &EngineConfig,
    ) -> Self {
        let guard = SecretGuard::new(Arc::clone(&directory));
        Self {
            directory,
            balances,
            ledger,
            rates,
            guard,
            fees: FeeSchedule::new(config.fee_rate, config.amount_scale),
        }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    // ───────────────────────── Operations ─────────────────────────

    /// Credit funds into a wallet. No authorization: funds entering is not
    /// identity-sensitive. Returns the new balance.
    pub async fn deposit(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.validate_amount(amount)?;
        self.directory.active_wallet(wallet)?;
        self.directory.currency(currency)?;

        let new_balance = self.balances.credit(wallet, currency, amount).await?;

        self.record(LedgerRecord::Deposit(DepositRecord {
            record_id: RecordId::new(),
            wallet: wallet.clone(),
            currency,
            amount,
            fee: Decimal::ZERO,
            new_balance,
            recorded_at: now_millis(),
        }))
        .await?;

        info!(%wallet, %currency, %amount, %new_balance, "deposit completed");
        Ok(new_balance)
    }

    /// Debit funds from a wallet: `amount` plus the withdrawal fee, in one
    /// atomic check-and-decrement. Returns the new balance.
    pub async fn withdraw(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
        secret: &str,
    ) -> Result<Decimal, LedgerError> {
        self.validate_amount(amount)?;
        self.directory.active_wallet(wallet)?;
        self.directory.currency(currency)?;
        self.authorize(wallet, secret)?;

        let (fee, total) = self.amount_with_fee(amount)?;
        let new_balance = self.balances.try_debit(wallet, currency, total).await?;

        self.record(LedgerRecord::Withdrawal(WithdrawalRecord {
            record_id: RecordId::new(),
            wallet: wallet.clone(),
            currency,
            amount,
            fee,
            new_balance,
            recorded_at: now_millis(),
        }))
        .await?;

        info!(%wallet, %currency, %amount, %fee, %new_balance, "withdrawal completed");
        Ok(new_balance)
    }

    /// Convert between two of a wallet's own currency balances at the
    /// current spot rate. The fee is charged on the destination side;
    /// returns the net amount credited.
    pub async fn convert(
        &self,
        wallet: &WalletAddress,
        source: CurrencyId,
        dest: CurrencyId,
        source_amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.validate_amount(source_amount)?;
        self.directory.active_wallet(wallet)?;
        let source_currency = self.directory.currency(source)?;
        let dest_currency = self.directory.currency(dest)?;

        // Rate lookup is network-bound; it runs strictly before the
        // mutating phase and holds no store lock.
        let rate = self
            .rates
            .rate(&source_currency.code, &dest_currency.code)
            .await?;

        let gross = source_amount
            .checked_mul(rate)
            .map(|g| self.fees.quantize(g))
            .ok_or(LedgerError::InvalidAmount)?;
        let fee = self.fees.fee(gross).ok_or(LedgerError::InvalidAmount)?;
        let net = gross - fee;
        if net <= Decimal::ZERO {
            // Conversion smaller than the smallest storable unit.
            return Err(LedgerError::InvalidAmount);
        }

        let (_, new_dest_balance) = self
            .balances
            .atomic_pair(
                Mutation::new(wallet.clone(), source, source_amount),
                Mutation::new(wallet.clone(), dest, net),
            )
            .await?;

        self.record(LedgerRecord::Conversion(ConversionRecord {
            record_id: RecordId::new(),
            wallet: wallet.clone(),
            source_currency: source,
            dest_currency: dest,
            source_amount,
            dest_amount: net,
            fee,
            rate_used: rate,
            recorded_at: now_millis(),
        }))
        .await?;

        info!(
            %wallet, %source, %dest, %source_amount, %rate, %net, %new_dest_balance,
            "conversion completed"
        );
        Ok(net)
    }

    /// Move funds between two wallets in one currency. The source pays
    /// `amount` plus the transfer fee; the destination receives exactly
    /// `amount`. Returns `(total debited, amount credited)`.
    pub async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        currency: CurrencyId,
        amount: Decimal,
        secret: &str,
    ) -> Result<(Decimal, Decimal), LedgerError> {
        self.validate_amount(amount)?;
        self.directory.active_wallet(from)?;
        // The destination is credited, which is a mutation; it must be
        // active too.
        self.directory.active_wallet(to)?;
        self.directory.currency(currency)?;
        self.authorize(from, secret)?;

        let (fee, total) = self.amount_with_fee(amount)?;

        self.balances
            .atomic_pair(
                Mutation::new(from.clone(), currency, total),
                Mutation::new(to.clone(), currency, amount),
            )
            .await?;

        self.record(LedgerRecord::Transfer(TransferRecord {
            record_id: RecordId::new(),
            from_wallet: from.clone(),
            to_wallet: to.clone(),
            currency,
            amount,
            fee,
            recorded_at: now_millis(),
        }))
        .await?;

        info!(%from, %to, %currency, %amount, %fee, "transfer completed");
        Ok((total, amount))
    }

    // ───────────────────────── Read paths ─────────────────────────

    /// Balance of one (wallet, currency) row. Blocked wallets may still be
    /// read; only mutation is rejected.
    pub async fn balance(
        &self,
        wallet: &WalletAddress,
        currency: CurrencyId,
    ) -> Result<Decimal, LedgerError> {
        self.directory.wallet(wallet)?;
        self.directory.currency(currency)?;
        self.balances.read(wallet, currency).await
    }

    /// All balances for a wallet, joined against currency reference data.
    pub async fn balances(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Vec<(Currency, Decimal)>, LedgerError> {
        self.directory.wallet(wallet)?;
        let rows = self.balances.balances_of(wallet).await?;
        rows.into_iter()
            .map(|(id, amount)| Ok((self.directory.currency(id)?, amount)))
            .collect()
    }

    // ───────────────────────── Internals ─────────────────────────

    fn validate_amount(&self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        // Finer than the smallest storable unit is malformed input.
        if amount.normalize().scale() > self.fees.scale() {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(())
    }

    /// Fee and total debit for a gross amount. An amount whose fee or
    /// total leaves the representable range is rejected as `InvalidAmount`.
    fn amount_with_fee(&self, amount: Decimal) -> Result<(Decimal, Decimal), LedgerError> {
        let fee = self.fees.fee(amount).ok_or(LedgerError::InvalidAmount)?;
        let total = amount.checked_add(fee).ok_or(LedgerError::InvalidAmount)?;
        Ok((fee, total))
    }

    fn authorize(&self, wallet: &WalletAddress, secret: &str) -> Result<(), LedgerError> {
        if !self.guard.verify(wallet, secret) {
            warn!(%wallet, "authorization failed");
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    async fn record(&self, entry: LedgerRecord) -> Result<RecordId, LedgerError> {
        self.ledger.record(entry).await
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::default_currencies;
    use crate::rates::FixedRates;
    use crate::recorder::InMemoryLedger;
    use crate::store::InMemoryBalanceStore;

    struct Fixture {
        engine: LedgerEngine,
        directory: Arc<WalletDirectory>,
        balances: Arc<InMemoryBalanceStore>,
        ledger: Arc<InMemoryLedger>,
        rates: Arc<FixedRates>,
    }

    fn fixture() -> Fixture {
        let config = EngineConfig::default();
        let directory = Arc::new(WalletDirectory::new(&config));
        for currency in default_currencies() {
            directory.register_currency(currency);
        }
        let balances = Arc::new(InMemoryBalanceStore::new(&config));
        let ledger = Arc::new(InMemoryLedger::new());
        let rates = Arc::new(FixedRates::new());
        let engine = LedgerEngine::new(
            Arc::clone(&directory),
            balances.clone() as Arc<dyn BalanceStore>,
            ledger.clone() as Arc<dyn LedgerRecorder>,
            rates.clone() as Arc<dyn RateProvider>,
            &config,
        );
        Fixture {
            engine,
            directory,
            balances,
            ledger,
            rates,
        }
    }

    async fn funded_wallet(fix: &Fixture, amount: Decimal) -> (WalletAddress, String) {
        let creds = fix.directory.create_wallet();
        fix.balances
            .provision(&creds.wallet.address, &fix.directory.currency_ids())
            .await
            .unwrap();
        if amount > Decimal::ZERO {
            fix.engine
                .deposit(&creds.wallet.address, CurrencyId::new(1), amount)
                .await
                .unwrap();
        }
        (creds.wallet.address, creds.secret)
    }

    #[tokio::test]
    async fn test_zero_and_negative_amounts_rejected_everywhere() {
        let fix = fixture();
        let (wallet, secret) = funded_wallet(&fix, Decimal::from(10)).await;
        let btc = CurrencyId::new(1);

        for bad in [Decimal::ZERO, Decimal::from(-1)] {
            assert_eq!(
                fix.engine.deposit(&wallet, btc, bad).await.unwrap_err(),
                LedgerError::InvalidAmount
            );
            assert_eq!(
                fix.engine
                    .withdraw(&wallet, btc, bad, &secret)
                    .await
                    .unwrap_err(),
                LedgerError::InvalidAmount
            );
            assert_eq!(
                fix.engine
                    .convert(&wallet, btc, CurrencyId::new(2), bad)
                    .await
                    .unwrap_err(),
                LedgerError::InvalidAmount
            );
        }
        // nothing recorded for rejected operations
        assert_eq!(fix.ledger.records_for(&wallet).len(), 1); // the funding deposit
    }

    #[tokio::test]
    async fn test_amount_finer_than_storable_unit_rejected() {
        let fix = fixture();
        let (wallet, _) = funded_wallet(&fix, Decimal::ZERO).await;
        let too_fine = Decimal::new(123_456_789_1, 10); // 9+ decimal places
        assert_eq!(
            fix.engine
                .deposit(&wallet, CurrencyId::new(1), too_fine)
                .await
                .unwrap_err(),
            LedgerError::InvalidAmount
        );
    }

    #[tokio::test]
    async fn test_unknown_currency_fails_before_store_access() {
        let fix = fixture();
        let (wallet, _) = funded_wallet(&fix, Decimal::ZERO).await;
        let err = fix
            .engine
            .deposit(&wallet, CurrencyId::new(77), Decimal::ONE)
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::CurrencyNotFound { id: 77 });
    }

    #[tokio::test]
    async fn test_blocked_wallet_fails_before_authorization() {
        use ledger_types::wallet::WalletStatus;

        let fix = fixture();
        let (wallet, _) = funded_wallet(&fix, Decimal::from(10)).await;
        fix.directory
            .set_status(&wallet, WalletStatus::Blocked)
            .unwrap();

        // Even a wrong secret reports WalletBlocked, not Unauthorized.
        let err = fix
            .engine
            .withdraw(&wallet, CurrencyId::new(1), Decimal::ONE, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WalletBlocked { .. }));
    }

    #[tokio::test]
    async fn test_withdraw_bad_secret_unauthorized() {
        let fix = fixture();
        let (wallet, secret) = funded_wallet(&fix, Decimal::from(10)).await;
        let err = fix
            .engine
            .withdraw(&wallet, CurrencyId::new(1), Decimal::ONE, "nope")
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
        // the right secret still works afterwards
        fix.engine
            .withdraw(&wallet, CurrencyId::new(1), Decimal::ONE, &secret)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_convert_rate_unavailable_aborts_before_mutation() {
        let fix = fixture();
        let (wallet, _) = funded_wallet(&fix, Decimal::from(10)).await;
        // no rate configured in FixedRates
        let err = fix
            .engine
            .convert(&wallet, CurrencyId::new(1), CurrencyId::new(2), Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ExchangeUnavailable { .. }));
        assert_eq!(
            fix.engine.balance(&wallet, CurrencyId::new(1)).await.unwrap(),
            Decimal::from(10)
        );
    }

    #[tokio::test]
    async fn test_extreme_amounts_rejected_not_aborted() {
        let fix = fixture();
        let (wallet, secret) = funded_wallet(&fix, Decimal::from(10)).await;
        let btc = CurrencyId::new(1);

        // fee/total computation must reject amounts near the numeric
        // ceiling instead of overflowing
        assert_eq!(
            fix.engine
                .withdraw(&wallet, btc, Decimal::MAX, &secret)
                .await
                .unwrap_err(),
            LedgerError::InvalidAmount
        );

        let (other, _) = funded_wallet(&fix, Decimal::ZERO).await;
        assert_eq!(
            fix.engine
                .transfer(&wallet, &other, btc, Decimal::MAX, &secret)
                .await
                .unwrap_err(),
            LedgerError::InvalidAmount
        );

        // the gross computation hits the same ceiling through the rate
        fix.rates.set("BTC", "ETH", Decimal::MAX);
        assert_eq!(
            fix.engine
                .convert(&wallet, btc, CurrencyId::new(2), Decimal::from(10))
                .await
                .unwrap_err(),
            LedgerError::InvalidAmount
        );

        // nothing mutated, nothing recorded beyond the funding deposit
        assert_eq!(
            fix.engine.balance(&wallet, btc).await.unwrap(),
            Decimal::from(10)
        );
        assert_eq!(fix.ledger.records_for(&wallet).len(), 1);
    }

    #[tokio::test]
    async fn test_convert_records_rate_used() {
        let fix = fixture();
        let (wallet, _) = funded_wallet(&fix, Decimal::from(10)).await;
        fix.rates.set("BTC", "ETH", Decimal::from(2));

        let net = fix
            .engine
            .convert(&wallet, CurrencyId::new(1), CurrencyId::new(2), Decimal::from(10))
            .await
            .unwrap();
        assert_eq!(net, Decimal::from_str_exact("19.6").unwrap());

        let records = fix.ledger.records_for(&wallet);
        let conversion = records
            .iter()
            .find_map(|r| match r {
                LedgerRecord::Conversion(c) => Some(c),
                _ => None,
            })
            .expect("conversion record present");
        assert_eq!(conversion.rate_used, Decimal::from(2));
        assert_eq!(conversion.fee, Decimal::from_str_exact("0.4").unwrap());
    }
}
