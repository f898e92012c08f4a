//! # Pool Ledger Service
//!
//! Stateful half of the launchpad AMM. Owns the token registry, pool rows,
//! the append-only price history and the activity feed, and drives every
//! pool mutation through quote, settlement and a versioned commit.
//!
//! ## Architecture Role
//!
//! ```text
//! request ──► PoolService ──► amm (quote) ──► SettlementClient (chain)
//!                  │                                   │
//!                  └──── PoolLedger::commit ◄──────────┘
//!                        (CAS on version + price point)
//! ```
//!
//! ## Concurrency
//!
//! Mutations of one pool are serialized by the ledger's compare-and-swap;
//! different pools never contend. Dropping a service future before its
//! commit leaves the ledger untouched.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod service;
pub mod settlement;

pub use error::{LedgerError, Result};
pub use ledger::PoolLedger;
pub use memory::{InMemoryLedger, LedgerStats};
pub use service::{
    DepositRequest, LiquidityReceipt, PoolService, SwapPreview, SwapReceipt, SwapRequest,
    WithdrawRequest,
};
pub use settlement::{
    LiquidityInstruction, LiquiditySettlement, SettlementClient, SimulatedSettlement,
    SwapInstruction, SwapSettlement,
};
