//! Reserve model: the canonical price formula and reserve validation
//!
//! Every price shown or recorded anywhere (pool creation, swap recording,
//! chart current price, pool detail) comes from [`price`]. Do not divide
//! reserves ad hoc elsewhere.

use rust_decimal::Decimal;
use types::{decimal_from_f64, AmmError, Reserves};

/// Price of token A denominated in token B
///
/// Returns `reserve_b / reserve_a`, or zero when `reserve_a` is not
/// positive (empty pool, price undefined by convention).
///
/// A ratio too large for `Decimal` fails with [`AmmError::InvalidReserve`];
/// such reserves cannot be priced and the ledger refuses to store them.
pub fn price(reserve_a: Decimal, reserve_b: Decimal) -> Result<Decimal, AmmError> {
    if reserve_a <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    reserve_b
        .checked_div(reserve_a)
        .ok_or_else(|| AmmError::InvalidReserve {
            field: "reserve_b",
            value: format!("{} / {} overflows the price", reserve_b, reserve_a),
        })
}

/// Reject negative reserve values
pub fn validate_reserves(reserve_a: Decimal, reserve_b: Decimal) -> Result<(), AmmError> {
    Reserves::new(reserve_a, reserve_b, Decimal::ZERO).check_non_negative()
}

/// Validate float reserves from an external boundary
///
/// Non-finite values fail with [`AmmError::InvalidReserve`] before the
/// non-negativity check runs.
pub fn validate_reserves_f64(reserve_a: f64, reserve_b: f64) -> Result<(Decimal, Decimal), AmmError> {
    let convert = |field: &'static str, value: f64| {
        decimal_from_f64(field, value).map_err(|_| AmmError::InvalidReserve {
            field,
            value: value.to_string(),
        })
    };
    let a = convert("reserve_a", reserve_a)?;
    let b = convert("reserve_b", reserve_b)?;
    validate_reserves(a, b)?;
    Ok((a, b))
}
