//! Pure derivations behind the two denormalized values in the ledger:
//! a sale's `total_price` and a variant's `stock`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::entities::{sales_record, stock_transaction, stock_transaction::MovementKind};
use crate::ledger::error::{LedgerError, LedgerResult};

/// Anything that contributes `qty × price_each` to a sale total.
pub trait LineAmount {
    fn qty(&self) -> i32;
    fn price_each(&self) -> Decimal;
}

impl LineAmount for sales_record::Model {
    fn qty(&self) -> i32 {
        self.qty
    }

    fn price_each(&self) -> Decimal {
        self.price_each
    }
}

/// A priced line that has not been persisted yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricedLine {
    pub qty: i32,
    pub price_each: Decimal,
}

impl LineAmount for PricedLine {
    fn qty(&self) -> i32 {
        self.qty
    }

    fn price_each(&self) -> Decimal {
        self.price_each
    }
}

/// Anything that moves stock in or out of a variant.
pub trait Movement {
    fn qty(&self) -> i32;
    fn kind(&self) -> MovementKind;
}

impl Movement for stock_transaction::Model {
    fn qty(&self) -> i32 {
        self.qty
    }

    fn kind(&self) -> MovementKind {
        self.kind
    }
}

impl Movement for (MovementKind, i32) {
    fn qty(&self) -> i32 {
        self.1
    }

    fn kind(&self) -> MovementKind {
        self.0
    }
}

/// Rounds a money amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest unit price the `Decimal(10, 2)` price columns can hold.
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

pub fn price_in_range(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= max_price()
}

/// Sum of `qty × price_each` over all lines, rounded once at the end.
/// Fails instead of wrapping when the sum leaves the decimal range.
pub fn compute_total<L: LineAmount>(lines: &[L]) -> LedgerResult<Decimal> {
    let sum = lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        Decimal::from(line.qty())
            .checked_mul(line.price_each())
            .and_then(|amount| sum.checked_add(amount))
            .ok_or(LedgerError::AmountOverflow)
    })?;
    Ok(round_money(sum))
}

/// Stock balance implied by a movement log: Σ in − Σ out.
pub fn fold_movements<M: Movement>(movements: &[M]) -> i64 {
    movements.iter().fold(0i64, |balance, movement| {
        apply_movement(balance, movement.kind(), movement.qty())
    })
}

pub fn apply_movement(balance: i64, kind: MovementKind, qty: i32) -> i64 {
    match kind {
        MovementKind::In => balance + i64::from(qty),
        MovementKind::Out => balance - i64::from(qty),
    }
}
