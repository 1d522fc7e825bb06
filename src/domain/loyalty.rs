//! Loyalty points earned by paying for an order.
//!
//! The base award is the order total itself, one point per currency unit with
//! any fraction truncated. Orders at or above [`BONUS_THRESHOLD`] earn a flat
//! [`FLAT_BONUS`] on top. There is no exchange rate between money and points.

use crate::domain::order::Money;
use crate::domain::user::CreditPoints;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Inclusive: a total of exactly 100 qualifies.
pub const BONUS_THRESHOLD: Decimal = dec!(100);
pub const FLAT_BONUS: u64 = 10;

/// Points earned for paying `total`, bonus included.
///
/// Returns `None` only when the total does not fit in the points accumulator.
pub fn points_for(total: Money) -> Option<CreditPoints> {
    let base = total.value().trunc().to_u64()?;
    let bonus = if total.value() >= BONUS_THRESHOLD {
        FLAT_BONUS
    } else {
        0
    };
    base.checked_add(bonus).map(CreditPoints)
}
