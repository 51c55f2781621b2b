//! Append-only ledger record variants
//!
//! Records are immutable audit entries emitted once per completed
//! financial operation. They are never mutated or deleted and serve as the
//! system of record for reconciliation and dispute resolution.
//!
//! The orchestrator guarantees a record is written if and only if the
//! corresponding balance mutation committed.

use crate::ids::{CurrencyId, RecordId, WalletAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Funds entered a wallet. Deposits carry no fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub record_id: RecordId,
    pub wallet: WalletAddress,
    pub currency: CurrencyId,
    pub amount: Decimal,
    /// Always zero for deposits; kept so every variant reconciles the same way
    pub fee: Decimal,
    pub new_balance: Decimal,
    /// Unix milliseconds
    pub recorded_at: i64,
}

/// Funds left a wallet. The debited total is `amount + fee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub record_id: RecordId,
    pub wallet: WalletAddress,
    pub currency: CurrencyId,
    pub amount: Decimal,
    pub fee: Decimal,
    pub new_balance: Decimal,
    pub recorded_at: i64,
}

/// A wallet converted between two of its own currency balances.
///
/// `rate_used` is recorded because the spot rate varies between calls; the
/// record must be reproducible without re-querying the rate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub record_id: RecordId,
    pub wallet: WalletAddress,
    pub source_currency: CurrencyId,
    pub dest_currency: CurrencyId,
    pub source_amount: Decimal,
    /// Amount credited to the destination, net of fee
    pub dest_amount: Decimal,
    pub fee: Decimal,
    pub rate_used: Decimal,
    pub recorded_at: i64,
}

/// Funds moved between two wallets in one currency.
///
/// The source is debited `amount + fee`; the destination is credited
/// `amount`. The fee is retained by the system, not credited anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub record_id: RecordId,
    pub from_wallet: WalletAddress,
    pub to_wallet: WalletAddress,
    pub currency: CurrencyId,
    pub amount: Decimal,
    pub fee: Decimal,
    pub recorded_at: i64,
}

/// Enum wrapper for all ledger record variants, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerRecord {
    Deposit(DepositRecord),
    Withdrawal(WithdrawalRecord),
    Conversion(ConversionRecord),
    Transfer(TransferRecord),
}

impl LedgerRecord {
    /// Record id, uniform across variants.
    pub fn record_id(&self) -> RecordId {
        match self {
            LedgerRecord::Deposit(r) => r.record_id,
            LedgerRecord::Withdrawal(r) => r.record_id,
            LedgerRecord::Conversion(r) => r.record_id,
            LedgerRecord::Transfer(r) => r.record_id,
        }
    }

    /// Fee charged by the operation.
    pub fn fee(&self) -> Decimal {
        match self {
            LedgerRecord::Deposit(r) => r.fee,
            LedgerRecord::Withdrawal(r) => r.fee,
            LedgerRecord::Conversion(r) => r.fee,
            LedgerRecord::Transfer(r) => r.fee,
        }
    }

    /// True if the record mentions the given wallet (as source or destination).
    pub fn touches(&self, wallet: &WalletAddress) -> bool {
        match self {
            LedgerRecord::Deposit(r) => &r.wallet == wallet,
            LedgerRecord::Withdrawal(r) => &r.wallet == wallet,
            LedgerRecord::Conversion(r) => &r.wallet == wallet,
            LedgerRecord::Transfer(r) => &r.from_wallet == wallet || &r.to_wallet == wallet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_record_serialization() {
        let record = DepositRecord {
            record_id: RecordId::new(),
            wallet: WalletAddress::new("9f2c41d8"),
            currency: CurrencyId::new(1),
            amount: Decimal::new(150_000_000, 8), // 1.5
            fee: Decimal::ZERO,
            new_balance: Decimal::new(150_000_000, 8),
            recorded_at: 1_708_123_456_789,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: DepositRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_conversion_record_serialization() {
        let record = ConversionRecord {
            record_id: RecordId::new(),
            wallet: WalletAddress::new("9f2c41d8"),
            source_currency: CurrencyId::new(1),
            dest_currency: CurrencyId::new(2),
            source_amount: Decimal::from(10),
            dest_amount: Decimal::from_str_exact("19.6").unwrap(),
            fee: Decimal::from_str_exact("0.4").unwrap(),
            rate_used: Decimal::from_str_exact("2.0").unwrap(),
            recorded_at: 1_708_123_456_789,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ConversionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_touches_transfer_both_sides() {
        let from = WalletAddress::new("aaaa");
        let to = WalletAddress::new("bbbb");
        let record = LedgerRecord::Transfer(TransferRecord {
            record_id: RecordId::new(),
            from_wallet: from.clone(),
            to_wallet: to.clone(),
            currency: CurrencyId::new(3),
            amount: Decimal::from(100),
            fee: Decimal::from(2),
            recorded_at: 0,
        });
        assert!(record.touches(&from));
        assert!(record.touches(&to));
        assert!(!record.touches(&WalletAddress::new("cccc")));
        assert_eq!(record.fee(), Decimal::from(2));
    }
}
