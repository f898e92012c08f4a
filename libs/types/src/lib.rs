//! # Launchpad Types
//!
//! Data model shared by the AMM engine, the pool ledger and the service
//! layer.
//!
//! ## Design Philosophy
//!
//! - **No Binary Floats**: reserves, LP supply and prices are `Decimal`;
//!   floats are converted once, at the boundary, by [`decimal_from_f64`]
//! - **Explicit Rounding**: payouts round down, charges round up, see
//!   [`common::precision`]
//! - **Closed Tags**: event and activity kinds are enums, never free strings
//! - **Opaque Identity**: addresses are validated non-empty strings and are
//!   never interpreted
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{PoolAddress, Reserves, TokenMint, TokenPairKey};
//! use rust_decimal_macros::dec;
//!
//! let pool = PoolAddress::new("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").unwrap();
//! let sol = TokenMint::new("So11111111111111111111111111111111111111112").unwrap();
//! let usdc = TokenMint::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v").unwrap();
//!
//! // The pair key ignores order
//! assert_eq!(
//!     TokenPairKey::new(&sol, &usdc).unwrap(),
//!     TokenPairKey::new(&usdc, &sol).unwrap(),
//! );
//!
//! let reserves = Reserves::new(dec!(100), dec!(400), dec!(200));
//! assert!(reserves.check_non_negative().is_ok());
//! # let _ = pool;
//! ```

pub mod common;
pub mod history;
pub mod pool;
pub mod token;
pub mod transaction;

pub use common::{
    decimal_from_f64, require_positive, round_charged, round_paid_out, AccountAddress, AmmError,
    PoolAddress, Result, TokenMint, TokenPairKey, TxSignature, WalletAddress, AMOUNT_EPSILON,
    AMOUNT_SCALE,
};
pub use history::{PriceEventKind, PriceHistoryPoint};
pub use pool::{NewPool, Pool, Reserves, SwapDirection};
pub use token::{NewToken, Token, TokenLinks, MAX_TOKEN_DECIMALS};
pub use transaction::{
    TransactionDetails, TransactionKind, TransactionPage, TransactionQuery, TransactionRecord,
    TransactionStatus, DEFAULT_PAGE_LIMIT, DEFAULT_RECENT_LIMIT,
};
