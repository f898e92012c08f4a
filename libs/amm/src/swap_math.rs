//! Constant-product swap math with exact decimal calculations
//!
//! Implements `x * y = k` with the fee taken from the input side before the
//! invariant is applied. All amounts are `Decimal`; rounding follows the
//! policy in `types::common::precision`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;
use types::{require_positive, round_charged, round_paid_out, AmmError, Reserves, SwapDirection};

/// Default pool fee (0.3%)
pub const DEFAULT_FEE_PERCENT: Decimal = dec!(0.3);

/// Default slippage tolerance applied by callers (0.5%)
pub const DEFAULT_SLIPPAGE_PERCENT: Decimal = dec!(0.5);

/// Result of a swap calculation, never persisted
///
/// A quote with `amount_out == 0` means insufficient liquidity; callers must
/// block the action rather than execute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_out: Decimal,
    /// Fee charged, denominated in the input token
    pub fee: Decimal,
    pub price_impact_percent: Decimal,
}

impl SwapQuote {
    pub const ZERO: Self = Self {
        amount_out: Decimal::ZERO,
        fee: Decimal::ZERO,
        price_impact_percent: Decimal::ZERO,
    };

    pub fn is_insufficient_liquidity(&self) -> bool {
        self.amount_out.is_zero()
    }

    pub fn impact_level(&self) -> PriceImpactLevel {
        PriceImpactLevel::from_percent(self.price_impact_percent)
    }
}

/// Severity bands shown next to a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceImpactLevel {
    /// Up to 2%
    Low,
    /// Above 2%, up to 5%
    Elevated,
    /// Above 5%, trade a smaller amount
    High,
}

impl PriceImpactLevel {
    pub fn from_percent(impact_percent: Decimal) -> Self {
        if impact_percent > dec!(5) {
            Self::High
        } else if impact_percent > dec!(2) {
            Self::Elevated
        } else {
            Self::Low
        }
    }
}

/// Reserves after a swap together with the quote that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub reserves: Reserves,
    pub quote: SwapQuote,
}

/// Constant-product swap functions
pub struct SwapMath;

impl SwapMath {
    /// Quote the output of selling `amount_in` into a pool
    ///
    /// # Arguments
    /// * `reserve_in` - Reserve of the token being sold
    /// * `reserve_out` - Reserve of the token being bought
    /// * `amount_in` - Amount sold, fee included
    /// * `fee_percent` - Pool fee in percent (0.3 = 0.3%)
    ///
    /// # Returns
    /// The quote, or [`SwapQuote::ZERO`] when any of `reserve_in > 0`,
    /// `reserve_out > 0`, `amount_in > 0`, `0 <= fee_percent < 100` fails.
    /// The output is always strictly below `reserve_out`.
    pub fn quote_swap(
        reserve_in: Decimal,
        reserve_out: Decimal,
        amount_in: Decimal,
        fee_percent: Decimal,
    ) -> SwapQuote {
        if reserve_in <= Decimal::ZERO
            || reserve_out <= Decimal::ZERO
            || amount_in <= Decimal::ZERO
            || fee_percent < Decimal::ZERO
            || fee_percent >= Decimal::ONE_HUNDRED
        {
            trace!(%reserve_in, %reserve_out, %amount_in, %fee_percent, "swap preconditions not met, zero quote");
            return SwapQuote::ZERO;
        }

        match Self::compute(reserve_in, reserve_out, amount_in, fee_percent) {
            Some(quote) => quote,
            None => {
                trace!(%reserve_in, %reserve_out, %amount_in, "swap output not representable, zero quote");
                SwapQuote::ZERO
            }
        }
    }

    fn compute(
        reserve_in: Decimal,
        reserve_out: Decimal,
        amount_in: Decimal,
        fee_percent: Decimal,
    ) -> Option<SwapQuote> {
        let fee = round_charged(amount_in.checked_mul(fee_percent)? / Decimal::ONE_HUNDRED);
        let amount_in_after_fee = amount_in - fee;
        if amount_in_after_fee <= Decimal::ZERO {
            return None;
        }

        // dy = y * dx / (x + dx), ratio first so the product cannot overflow
        let denominator = reserve_in.checked_add(amount_in_after_fee)?;
        let share = amount_in_after_fee.checked_div(denominator)?;
        let amount_out = round_paid_out(reserve_out.checked_mul(share)?);

        if amount_out.is_zero() || amount_out >= reserve_out {
            return None;
        }

        let spot_price = reserve_out.checked_div(reserve_in)?;
        let execution_price = amount_out.checked_div(amount_in)?;
        let price_impact_percent = (spot_price - execution_price)
            .abs()
            .checked_div(spot_price)?
            .checked_mul(Decimal::ONE_HUNDRED)?;

        Some(SwapQuote {
            amount_out,
            fee,
            price_impact_percent,
        })
    }

    /// Quote a swap against a reserve snapshot and return the new reserves
    ///
    /// LP supply is untouched by swaps.
    pub fn apply_swap(
        reserves: &Reserves,
        amount_in: Decimal,
        direction: SwapDirection,
        fee_percent: Decimal,
    ) -> Result<SwapOutcome, AmmError> {
        require_positive("amount_in", amount_in)?;

        let (reserve_in, reserve_out) = match direction {
            SwapDirection::AToB => (reserves.reserve_a, reserves.reserve_b),
            SwapDirection::BToA => (reserves.reserve_b, reserves.reserve_a),
        };
        let quote = Self::quote_swap(reserve_in, reserve_out, amount_in, fee_percent);
        if quote.is_insufficient_liquidity() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let reserves = Self::apply_settled(reserves, direction, amount_in, quote.amount_out)?;
        Ok(SwapOutcome { reserves, quote })
    }

    /// Apply already settled swap amounts to a reserve snapshot
    ///
    /// Used when replaying a finalized swap onto fresher reserves. Fails with
    /// [`AmmError::InsufficientLiquidity`] if the output would empty the
    /// out-side reserve.
    pub fn apply_settled(
        reserves: &Reserves,
        direction: SwapDirection,
        amount_in: Decimal,
        amount_out: Decimal,
    ) -> Result<Reserves, AmmError> {
        require_positive("amount_in", amount_in)?;
        require_positive("amount_out", amount_out)?;

        let (reserve_in, reserve_out) = match direction {
            SwapDirection::AToB => (reserves.reserve_a, reserves.reserve_b),
            SwapDirection::BToA => (reserves.reserve_b, reserves.reserve_a),
        };
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }
        let new_in = reserve_in
            .checked_add(amount_in)
            .ok_or_else(|| AmmError::invalid_amount("amount_in", "reserve overflow"))?;
        let new_out = reserve_out - amount_out;

        let (reserve_a, reserve_b) = match direction {
            SwapDirection::AToB => (new_in, new_out),
            SwapDirection::BToA => (new_out, new_in),
        };
        Ok(Reserves::new(reserve_a, reserve_b, reserves.lp_total_supply))
    }

    /// Lowest acceptable settled output for a quote
    ///
    /// `amount_out * (1 - slippage / 100)`, rounded down.
    pub fn min_amount_out(
        amount_out: Decimal,
        slippage_tolerance_percent: Decimal,
    ) -> Result<Decimal, AmmError> {
        if slippage_tolerance_percent < Decimal::ZERO
            || slippage_tolerance_percent > Decimal::ONE_HUNDRED
        {
            return Err(AmmError::invalid_amount(
                "slippage_tolerance_percent",
                format!("{} is outside [0, 100]", slippage_tolerance_percent),
            ));
        }
        let keep = Decimal::ONE - slippage_tolerance_percent / Decimal::ONE_HUNDRED;
        Ok(round_paid_out(amount_out * keep))
    }

    /// Input required to receive exactly `amount_out` (fee included)
    ///
    /// Inverse of [`SwapMath::quote_swap`], rounded up so the pool is never
    /// short-changed.
    pub fn quote_exact_out(
        reserve_in: Decimal,
        reserve_out: Decimal,
        amount_out: Decimal,
        fee_percent: Decimal,
    ) -> Result<Decimal, AmmError> {
        require_positive("reserve_in", reserve_in)?;
        require_positive("reserve_out", reserve_out)?;
        require_positive("amount_out", amount_out)?;
        if fee_percent < Decimal::ZERO || fee_percent >= Decimal::ONE_HUNDRED {
            return Err(AmmError::invalid_amount(
                "fee_percent",
                format!("{} is outside [0, 100)", fee_percent),
            ));
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let overflow = || AmmError::invalid_amount("amount_out", "calculation overflow");
        let after_fee = reserve_in
            .checked_mul(amount_out)
            .and_then(|n| n.checked_div(reserve_out - amount_out))
            .ok_or_else(overflow)?;
        let fee_multiplier = Decimal::ONE - fee_percent / Decimal::ONE_HUNDRED;
        let amount_in = after_fee.checked_div(fee_multiplier).ok_or_else(overflow)?;

        Ok(round_charged(amount_in))
    }
}
