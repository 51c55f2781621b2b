//! Property-based checks
//!
//! Fee rounding stays within half a smallest unit of the exact product,
//! and no sequence of store operations can drive a balance negative.

use proptest::prelude::*;
use rust_decimal::Decimal;

use ledger_engine::config::EngineConfig;
use ledger_engine::fee::FeeSchedule;
use ledger_engine::store::{BalanceStore, InMemoryBalanceStore};
use ledger_types::ids::{CurrencyId, WalletAddress};

const BTC: CurrencyId = CurrencyId::new(1);

fn two_percent() -> FeeSchedule {
    FeeSchedule::new(Decimal::new(2, 2), 8)
}

proptest! {
    #[test]
    fn fee_nonnegative_and_within_half_unit(units in 0u64..1_000_000_000_000u64) {
        let fees = two_percent();
        let amount = Decimal::new(units as i64, 8);
        let fee = fees.fee(amount).unwrap();

        prop_assert!(fee >= Decimal::ZERO);
        prop_assert!(fee.scale() <= 8);

        let exact = amount * Decimal::new(2, 2);
        let diff = (fee - exact).abs();
        // half-away-from-zero rounding to 8 places
        prop_assert!(diff <= Decimal::new(5, 9));
    }

    #[test]
    fn total_with_fee_never_below_amount(units in 1u64..1_000_000_000_000u64) {
        let fees = two_percent();
        let amount = Decimal::new(units as i64, 8);
        let total = fees.total_with_fee(amount).unwrap();
        prop_assert!(total >= amount);
        prop_assert_eq!(total - amount, fees.fee(amount).unwrap());
    }

    #[test]
    fn balances_never_negative_under_random_op_sequences(
        ops in prop::collection::vec((any::<bool>(), 1u64..10_000_000_000u64), 1..40)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async move {
            let wallet = WalletAddress::new("prop-wallet");
            let store = InMemoryBalanceStore::new(&EngineConfig::default());
            store.provision(&wallet, &[BTC]).await.unwrap();

            for (is_credit, units) in ops {
                let amount = Decimal::new(units as i64, 8);
                if is_credit {
                    store.credit(&wallet, BTC, amount).await.unwrap();
                } else {
                    // oversized debits are expected to fail; they must not
                    // change the row
                    let before = store.read(&wallet, BTC).await.unwrap();
                    if store.try_debit(&wallet, BTC, amount).await.is_err() {
                        assert_eq!(store.read(&wallet, BTC).await.unwrap(), before);
                    }
                }
                let balance = store.read(&wallet, BTC).await.unwrap();
                assert!(balance >= Decimal::ZERO, "negative balance: {balance}");
            }
        });
    }
}
