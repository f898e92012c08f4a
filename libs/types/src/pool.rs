//! Liquidity pool record and its reserve snapshot

use crate::common::{AccountAddress, PoolAddress, TokenMint, TokenPairKey, TxSignature, WalletAddress};
use crate::common::AmmError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token reserves and LP supply of a pool at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
    pub lp_total_supply: Decimal,
}

impl Reserves {
    pub const EMPTY: Self = Self {
        reserve_a: Decimal::ZERO,
        reserve_b: Decimal::ZERO,
        lp_total_supply: Decimal::ZERO,
    };

    pub fn new(reserve_a: Decimal, reserve_b: Decimal, lp_total_supply: Decimal) -> Self {
        Self {
            reserve_a,
            reserve_b,
            lp_total_supply,
        }
    }

    /// Pool has no outstanding LP shares (price treated as 0)
    pub fn has_no_providers(&self) -> bool {
        self.lp_total_supply.is_zero()
    }

    /// Check the non-negativity invariant on all three fields
    pub fn check_non_negative(&self) -> Result<(), AmmError> {
        for (field, value) in [
            ("reserve_a", self.reserve_a),
            ("reserve_b", self.reserve_b),
            ("lp_total_supply", self.lp_total_supply),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(AmmError::InvalidReserve {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Which side of the pair a swap sells into the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// Sell token A, receive token B
    AToB,
    /// Sell token B, receive token A
    BToA,
}

impl SwapDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::AToB => Self::BToA,
            Self::BToA => Self::AToB,
        }
    }
}

/// Durable pool record as held by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: PoolAddress,
    pub token_a_mint: TokenMint,
    pub token_b_mint: TokenMint,
    pub reserves: Reserves,
    pub lp_mint: AccountAddress,
    pub vault_a: AccountAddress,
    pub vault_b: AccountAddress,
    pub creator_wallet: WalletAddress,
    pub tx_signature: Option<TxSignature>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version, bumped by every committed mutation
    pub version: u64,
}

impl Pool {
    pub fn pair_key(&self) -> Result<TokenPairKey, AmmError> {
        TokenPairKey::new(&self.token_a_mint, &self.token_b_mint)
    }

    /// Mints sold and bought for a given direction
    pub fn mints_for(&self, direction: SwapDirection) -> (&TokenMint, &TokenMint) {
        match direction {
            SwapDirection::AToB => (&self.token_a_mint, &self.token_b_mint),
            SwapDirection::BToA => (&self.token_b_mint, &self.token_a_mint),
        }
    }

    /// (reserve_in, reserve_out) for a given direction
    pub fn reserves_for(&self, direction: SwapDirection) -> (Decimal, Decimal) {
        match direction {
            SwapDirection::AToB => (self.reserves.reserve_a, self.reserves.reserve_b),
            SwapDirection::BToA => (self.reserves.reserve_b, self.reserves.reserve_a),
        }
    }
}

/// Creation request for a pool whose accounts already exist on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    pub address: PoolAddress,
    pub token_a_mint: TokenMint,
    pub token_b_mint: TokenMint,
    pub lp_mint: AccountAddress,
    pub vault_a: AccountAddress,
    pub vault_b: AccountAddress,
    pub initial_amount_a: Decimal,
    pub initial_amount_b: Decimal,
    pub creator_wallet: WalletAddress,
    pub tx_signature: Option<TxSignature>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_reserves_rejected() {
        let reserves = Reserves::new(dec!(10), dec!(-1), dec!(5));
        assert_eq!(
            reserves.check_non_negative(),
            Err(AmmError::InvalidReserve {
                field: "reserve_b",
                value: "-1".to_string()
            })
        );
        assert!(Reserves::EMPTY.check_non_negative().is_ok());
        assert!(Reserves::EMPTY.has_no_providers());
    }

    #[test]
    fn test_direction_reversal() {
        assert_eq!(SwapDirection::AToB.reversed(), SwapDirection::BToA);
        assert_eq!(
            serde_json::to_string(&SwapDirection::BToA).unwrap(),
            "\"b_to_a\""
        );
    }
}
