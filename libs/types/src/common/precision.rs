//! Decimal precision and rounding policy for pool accounting
//!
//! Reserves, LP supply and amounts are `rust_decimal::Decimal` values. The
//! only place binary floating point enters is [`decimal_from_f64`], used at
//! configuration and user-input boundaries.
//!
//! ## Rounding rules
//!
//! - Amounts the pool pays out (swap output, withdrawn tokens, minted LP
//!   shares) round **down** to [`AMOUNT_SCALE`] places.
//! - Amounts the pool charges (swap fee, exact-out input) round **up**.
//! - Prices and percentages keep full `Decimal` precision.

use crate::common::errors::AmmError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on token amounts (SPL token maximum)
pub const AMOUNT_SCALE: u32 = 9;

/// Smallest representable token amount at [`AMOUNT_SCALE`]
pub const AMOUNT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, AMOUNT_SCALE);

/// Round an amount paid out by the pool (toward zero)
pub fn round_paid_out(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero)
}

/// Round an amount charged by the pool (away from zero)
pub fn round_charged(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::AwayFromZero)
}

/// Convert a float from an external boundary into a `Decimal`
///
/// Rejects NaN and infinities with [`AmmError::InvalidAmount`].
pub fn decimal_from_f64(field: &'static str, value: f64) -> Result<Decimal, AmmError> {
    if !value.is_finite() {
        return Err(AmmError::invalid_amount(
            field,
            format!("{} is not finite", value),
        ));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| AmmError::invalid_amount(field, format!("{} is out of range", value)))
}

/// Ensure a quoting input is strictly positive
pub fn require_positive(field: &'static str, value: Decimal) -> Result<Decimal, AmmError> {
    if value <= Decimal::ZERO {
        return Err(AmmError::invalid_amount(
            field,
            format!("{} must be positive", value),
        ));
    }
    Ok(value)
}
