//! Fee schedule
//!
//! A single percentage rate charged on withdrawal, conversion-destination,
//! and transfer. Pure decimal arithmetic; the fee is rounded
//! half-away-from-zero to the smallest storable unit so no binary
//! floating-point drift can enter the ledger.

use rust_decimal::{Decimal, RoundingStrategy};

/// Percentage fee calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    rate: Decimal,
    scale: u32,
}

impl FeeSchedule {
    pub fn new(rate: Decimal, scale: u32) -> Self {
        Self { rate, scale }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Fee for a gross amount: `amount * rate`, rounded half-away-from-zero
    /// to the storable scale. `None` if the product is not representable.
    pub fn fee(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.rate)
            .map(|raw| raw.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Gross amount plus its fee, the total a debit must cover. `None` on
    /// overflow.
    pub fn total_with_fee(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_add(self.fee(amount)?)
    }

    /// Round an amount to the storable scale, half-away-from-zero.
    pub fn quantize(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Storable scale (decimal places) of ledger amounts.
    pub fn scale(&self) -> u32 {
        self.scale
    }
}
