//! Append-only price history records

use crate::common::{PoolAddress, TxSignature};
use crate::pool::Reserves;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event that produced a price history point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceEventKind {
    Init,
    Swap,
    Deposit,
    Withdraw,
}

impl PriceEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Swap => "swap",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for PriceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable price observation recorded after a pool mutation
///
/// `price` and the reserve snapshot always describe the pool *after* the
/// triggering event. `sequence` is assigned by the ledger on append and
/// orders points that share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub pool_address: PoolAddress,
    pub price: Decimal,
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
    pub tx_signature: Option<TxSignature>,
    pub kind: PriceEventKind,
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
}

impl PriceHistoryPoint {
    /// Build an unsequenced point; the ledger fills in `sequence`
    ///
    /// The caller supplies `price` so that every point goes through the one
    /// canonical price function of the engine.
    pub fn new(
        pool_address: PoolAddress,
        reserves: &Reserves,
        price: Decimal,
        kind: PriceEventKind,
        tx_signature: Option<TxSignature>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            pool_address,
            price,
            reserve_a: reserves.reserve_a,
            reserve_b: reserves.reserve_b,
            tx_signature,
            kind,
            timestamp,
            sequence: 0,
        }
    }
}
