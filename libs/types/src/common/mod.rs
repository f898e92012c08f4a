//! Common identifiers, errors and precision helpers

pub mod errors;
pub mod identifiers;
pub mod precision;

pub use errors::{AmmError, Result};
pub use identifiers::{
    AccountAddress, PoolAddress, TokenMint, TokenPairKey, TxSignature, WalletAddress,
};
pub use precision::{
    decimal_from_f64, require_positive, round_charged, round_paid_out, AMOUNT_EPSILON,
    AMOUNT_SCALE,
};
