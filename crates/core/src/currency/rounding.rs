//! Rounding to the cent.
//!
//! Amounts shown to users and written to reports are rounded half away from
//! zero, which is how the payroll declaration rounds its figures. Engine
//! arithmetic stays unrounded.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Number of decimal places in a cent-precision amount.
pub const CENT_PLACES: u32 = 2;

/// Rounds an amount to two decimal places, midpoint away from zero.
#[must_use]
pub fn round_to_cent(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
