//! # Launchpad AMM Library - Constant-Product Accounting Engine
//!
//! ## Purpose
//!
//! Pure arithmetic for two-token constant-product pools: swap quotes with an
//! input-side fee, LP share minting and burning, and the price history
//! aggregation behind pool charts. Nothing here performs I/O or holds state;
//! callers pass reserves in and receive new reserves out.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool reserves from the pool ledger, user amounts from the API layer
//! - **Output Destinations**: Pool ledger commits, settlement quotes, chart endpoints
//! - **Precision**: `Decimal` throughout, payouts rounded down and charges rounded up
//!   at [`types::AMOUNT_SCALE`] places
//!
//! ## Architecture Role
//!
//! ```text
//! Reserves ──► SwapMath / LiquidityMath ──► new Reserves + quote ──► ledger commit
//!                                                                     │
//! PriceHistoryPoint[] ◄───────────────────────────────────────────────┘
//!        │
//!        └──► price_history::build_series ──► PriceSeries (chart)
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use amm::{dec, SwapMath, SwapDirection, Reserves};
//!
//! let reserves = Reserves::new(dec!(1000), dec!(1000), dec!(1000));
//! let outcome = SwapMath::apply_swap(&reserves, dec!(100), SwapDirection::AToB, dec!(0.3)).unwrap();
//! assert!(outcome.reserves.reserve_b < dec!(1000));
//! assert!(outcome.quote.amount_out > dec!(90));
//! ```

pub mod liquidity;
pub mod pool_traits;
pub mod price_history;
pub mod reserve;
pub mod swap_math;

pub use liquidity::{LiquidityChangeResult, LiquidityMath, WithdrawBasis};
pub use pool_traits::PricedPool;
pub use price_history::{build_series, window, PriceChange, PricePoint, PriceSeries, TimeRange};
pub use reserve::{price, validate_reserves, validate_reserves_f64};
pub use swap_math::{
    PriceImpactLevel, SwapMath, SwapOutcome, SwapQuote, DEFAULT_FEE_PERCENT,
    DEFAULT_SLIPPAGE_PERCENT,
};

pub use types::{Reserves, SwapDirection};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
