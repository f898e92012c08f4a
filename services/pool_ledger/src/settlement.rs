//! Settlement boundary
//!
//! Token transfers happen on chain. The service quotes, asks a
//! [`SettlementClient`] to execute, and commits whatever amounts the chain
//! finalized.

use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{round_paid_out, Pool, SwapDirection, TxSignature, WalletAddress};
use uuid::Uuid;

/// Swap to execute against a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInstruction {
    pub wallet: WalletAddress,
    pub direction: SwapDirection,
    pub amount_in: Decimal,
    pub quoted_amount_out: Decimal,
    pub min_amount_out: Decimal,
}

/// Deposit or withdrawal to execute against a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityInstruction {
    pub wallet: WalletAddress,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub lp_amount: Decimal,
}

/// Finalized swap amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSettlement {
    pub signature: TxSignature,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

/// Finalized liquidity amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquiditySettlement {
    pub signature: TxSignature,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub lp_amount: Decimal,
}

#[async_trait]
pub trait SettlementClient: Send + Sync {
    async fn settle_swap(&self, pool: &Pool, instruction: &SwapInstruction) -> Result<SwapSettlement>;

    async fn settle_deposit(
        &self,
        pool: &Pool,
        instruction: &LiquidityInstruction,
    ) -> Result<LiquiditySettlement>;

    async fn settle_withdraw(
        &self,
        pool: &Pool,
        instruction: &LiquidityInstruction,
    ) -> Result<LiquiditySettlement>;
}

/// Settles instantly at the quoted amounts
///
/// An optional output shortfall models price movement between quote and
/// execution.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSettlement {
    output_shortfall_percent: Decimal,
}

impl SimulatedSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `percent` less swap output than quoted
    pub fn with_output_shortfall(percent: Decimal) -> Result<Self> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(LedgerError::Settlement(format!(
                "shortfall {}% is outside [0, 100]",
                percent
            )));
        }
        Ok(Self {
            output_shortfall_percent: percent,
        })
    }

    fn signature() -> Result<TxSignature> {
        TxSignature::new(format!("sim-{}", Uuid::new_v4().simple())).map_err(LedgerError::from)
    }
}

#[async_trait]
impl SettlementClient for SimulatedSettlement {
    async fn settle_swap(&self, pool: &Pool, instruction: &SwapInstruction) -> Result<SwapSettlement> {
        let keep = Decimal::ONE - self.output_shortfall_percent / Decimal::ONE_HUNDRED;
        let amount_out = round_paid_out(instruction.quoted_amount_out * keep);
        debug!(pool = %pool.address, %amount_out, "Simulated swap settlement");
        Ok(SwapSettlement {
            signature: Self::signature()?,
            amount_in: instruction.amount_in,
            amount_out,
        })
    }

    async fn settle_deposit(
        &self,
        pool: &Pool,
        instruction: &LiquidityInstruction,
    ) -> Result<LiquiditySettlement> {
        debug!(pool = %pool.address, "Simulated deposit settlement");
        Ok(LiquiditySettlement {
            signature: Self::signature()?,
            amount_a: instruction.amount_a,
            amount_b: instruction.amount_b,
            lp_amount: instruction.lp_amount,
        })
    }

    async fn settle_withdraw(
        &self,
        pool: &Pool,
        instruction: &LiquidityInstruction,
    ) -> Result<LiquiditySettlement> {
        debug!(pool = %pool.address, "Simulated withdraw settlement");
        Ok(LiquiditySettlement {
            signature: Self::signature()?,
            amount_a: instruction.amount_a,
            amount_b: instruction.amount_b,
            lp_amount: instruction.lp_amount,
        })
    }
}
