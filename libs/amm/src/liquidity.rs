//! LP share issuance and redemption
//!
//! Deposits mint shares proportional to the growth of reserve A; the very
//! first deposit into an empty pool mints `sqrt(amount_a * amount_b)`.
//! Withdrawals pay out a fraction of both reserves and never let reserves
//! or LP supply go below zero.

use crate::reserve::price;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use types::{require_positive, round_charged, round_paid_out, AmmError, Reserves};

/// Outcome of a deposit or withdrawal, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityChangeResult {
    pub reserves: Reserves,
    pub lp_minted: Decimal,
    pub lp_burned: Decimal,
    /// Token A deposited, or returned to the provider on withdrawal
    pub amount_a: Decimal,
    /// Token B deposited, or returned to the provider on withdrawal
    pub amount_b: Decimal,
}

impl LiquidityChangeResult {
    pub fn new_lp_supply(&self) -> Decimal {
        self.reserves.lp_total_supply
    }
}

/// Denominator used to size a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawBasis {
    /// `lp_amount / caller_lp_balance * reserve`, as the dashboard estimates it
    #[default]
    CallerBalance,
    /// `lp_amount / lp_total_supply * reserve`, as the on-chain program pays
    TotalSupply,
}

/// LP share math functions
pub struct LiquidityMath;

impl LiquidityMath {
    /// Quote a deposit of `amount_a`/`amount_b` into the pool
    ///
    /// The amounts are assumed to already match the pool ratio (see
    /// [`LiquidityMath::matching_amount_b`]); a mismatched ratio dilutes the
    /// depositor and is not detected here.
    ///
    /// When `reserve_a` is zero the pool is being bootstrapped: the new LP
    /// supply is `sqrt(amount_a * amount_b)` and all of it goes to the
    /// depositor.
    ///
    /// A deposit that would mint zero shares fails with
    /// [`AmmError::InvalidAmount`]. This covers a funded pool whose LP supply
    /// has been burned to zero.
    pub fn quote_deposit(
        reserves: &Reserves,
        amount_a: Decimal,
        amount_b: Decimal,
    ) -> Result<LiquidityChangeResult, AmmError> {
        require_positive("amount_a", amount_a)?;
        require_positive("amount_b", amount_b)?;
        reserves.check_non_negative()?;

        let overflow = |field| AmmError::invalid_amount(field, "calculation overflow");

        let (new_lp_supply, lp_minted) = if reserves.reserve_a.is_zero() {
            let product = amount_a.checked_mul(amount_b).ok_or_else(|| overflow("amount_b"))?;
            let minted = round_paid_out(decimal_sqrt(product).ok_or_else(|| overflow("amount_b"))?);
            (minted, minted)
        } else {
            let share_increase = amount_a
                .checked_div(reserves.reserve_a)
                .ok_or_else(|| overflow("amount_a"))?;
            let growth = Decimal::ONE
                .checked_add(share_increase)
                .ok_or_else(|| overflow("amount_a"))?;
            let new_supply = reserves
                .lp_total_supply
                .checked_mul(growth)
                .map(round_paid_out)
                .ok_or_else(|| overflow("amount_a"))?;
            (new_supply, new_supply - reserves.lp_total_supply)
        };
        // Reserves without LP supply would swallow the deposit
        if lp_minted <= Decimal::ZERO {
            return Err(AmmError::invalid_amount("amount_a", "deposit would mint no LP shares"));
        }

        let reserve_a = reserves
            .reserve_a
            .checked_add(amount_a)
            .ok_or_else(|| overflow("amount_a"))?;
        let reserve_b = reserves
            .reserve_b
            .checked_add(amount_b)
            .ok_or_else(|| overflow("amount_b"))?;

        Ok(LiquidityChangeResult {
            reserves: Reserves::new(reserve_a, reserve_b, new_lp_supply),
            lp_minted,
            lp_burned: Decimal::ZERO,
            amount_a,
            amount_b,
        })
    }

    /// Quote redeeming `lp_amount` shares out of a provider's balance
    ///
    /// Payouts are `(lp_amount / caller_lp_balance) * reserve`. The engine
    /// trusts `lp_amount <= caller_lp_balance`; the balance itself lives on
    /// chain. Reserves and LP supply are floored at zero.
    pub fn quote_withdraw(
        reserves: &Reserves,
        lp_amount: Decimal,
        caller_lp_balance: Decimal,
    ) -> Result<LiquidityChangeResult, AmmError> {
        require_positive("lp_amount", lp_amount)?;
        require_positive("caller_lp_balance", caller_lp_balance)?;
        reserves.check_non_negative()?;

        let overflow = || AmmError::invalid_amount("lp_amount", "calculation overflow");
        let fraction = lp_amount.checked_div(caller_lp_balance).ok_or_else(overflow)?;
        let amount_a = round_paid_out(reserves.reserve_a.checked_mul(fraction).ok_or_else(overflow)?);
        let amount_b = round_paid_out(reserves.reserve_b.checked_mul(fraction).ok_or_else(overflow)?);

        let reserve_a = (reserves.reserve_a - amount_a).max(Decimal::ZERO);
        let reserve_b = (reserves.reserve_b - amount_b).max(Decimal::ZERO);
        let new_lp_supply = (reserves.lp_total_supply - lp_amount).max(Decimal::ZERO);

        Ok(LiquidityChangeResult {
            reserves: Reserves::new(reserve_a, reserve_b, new_lp_supply),
            lp_minted: Decimal::ZERO,
            lp_burned: reserves.lp_total_supply - new_lp_supply,
            amount_a,
            amount_b,
        })
    }

    /// Quote a withdrawal sized against total LP supply
    pub fn quote_withdraw_pro_rata(
        reserves: &Reserves,
        lp_amount: Decimal,
    ) -> Result<LiquidityChangeResult, AmmError> {
        if reserves.lp_total_supply <= Decimal::ZERO {
            return Err(AmmError::InsufficientLiquidity);
        }
        Self::quote_withdraw(reserves, lp_amount, reserves.lp_total_supply)
    }

    /// Dispatch on the configured withdrawal basis
    pub fn quote_withdraw_with(
        basis: WithdrawBasis,
        reserves: &Reserves,
        lp_amount: Decimal,
        caller_lp_balance: Decimal,
    ) -> Result<LiquidityChangeResult, AmmError> {
        match basis {
            WithdrawBasis::CallerBalance => {
                Self::quote_withdraw(reserves, lp_amount, caller_lp_balance)
            }
            WithdrawBasis::TotalSupply => Self::quote_withdraw_pro_rata(reserves, lp_amount),
        }
    }

    /// Apply an already settled withdrawal to a reserve snapshot
    ///
    /// Replays the finalized payout onto fresher reserves, flooring every
    /// field at zero.
    pub fn apply_settled_withdraw(
        reserves: &Reserves,
        amount_a: Decimal,
        amount_b: Decimal,
        lp_amount: Decimal,
    ) -> Result<LiquidityChangeResult, AmmError> {
        require_positive("lp_amount", lp_amount)?;
        if amount_a.is_sign_negative() || amount_b.is_sign_negative() {
            return Err(AmmError::invalid_amount(
                "amount_a",
                "settled withdrawal amounts must not be negative",
            ));
        }

        let new_lp_supply = (reserves.lp_total_supply - lp_amount).max(Decimal::ZERO);
        Ok(LiquidityChangeResult {
            reserves: Reserves::new(
                (reserves.reserve_a - amount_a).max(Decimal::ZERO),
                (reserves.reserve_b - amount_b).max(Decimal::ZERO),
                new_lp_supply,
            ),
            lp_minted: Decimal::ZERO,
            lp_burned: reserves.lp_total_supply - new_lp_supply,
            amount_a,
            amount_b,
        })
    }

    /// Token B amount that keeps a deposit of `amount_a` at the pool ratio
    pub fn matching_amount_b(reserves: &Reserves, amount_a: Decimal) -> Result<Decimal, AmmError> {
        require_positive("amount_a", amount_a)?;
        let spot = price(reserves.reserve_a, reserves.reserve_b)?;
        amount_a
            .checked_mul(spot)
            .map(round_charged)
            .ok_or_else(|| AmmError::invalid_amount("amount_a", "calculation overflow"))
    }

    /// Check deposit amounts against the pool ratio
    ///
    /// An empty pool accepts any ratio (it is being priced by this deposit).
    pub fn validate_deposit_ratio(
        reserves: &Reserves,
        amount_a: Decimal,
        amount_b: Decimal,
        tolerance_percent: Decimal,
    ) -> Result<(), AmmError> {
        require_positive("amount_b", amount_b)?;
        if reserves.reserve_a.is_zero() || reserves.reserve_b.is_zero() {
            return Ok(());
        }
        let expected = Self::matching_amount_b(reserves, amount_a)?;
        let deviation_percent = (amount_b - expected)
            .abs()
            .checked_div(expected)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| AmmError::invalid_amount("amount_b", "deviation from pool ratio overflows"))?;
        if deviation_percent > tolerance_percent {
            return Err(AmmError::DepositRatioMismatch {
                expected,
                actual: amount_b,
                deviation_percent,
            });
        }
        Ok(())
    }
}

/// Square root of a Decimal using Newton's method
fn decimal_sqrt(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }

    let epsilon = dec!(0.000000000000000001);
    let mut x = if value > Decimal::ONE { value } else { Decimal::ONE };

    // x_new = (x + value/x) / 2
    for _ in 0..200 {
        let next_x = (x + value.checked_div(x)?) / dec!(2);
        if next_x == x || (next_x - x).abs() < epsilon {
            x = next_x;
            break;
        }
        x = next_x;
    }

    // Clear residue from the last division before truncating to amount scale
    Some(x.round_dp(18))
}
