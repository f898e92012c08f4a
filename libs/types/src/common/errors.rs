//! Error types for pool accounting and identifier validation
//!
//! Every fallible engine operation returns [`AmmError`]. Soft rejections
//! (a swap quote with zero output) are values, not errors, and only become
//! [`AmmError::InsufficientLiquidity`] when a caller tries to act on them.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the accounting engine and the pool data model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// Referenced pool address has no ledger record
    #[error("Pool not found: {address}")]
    PoolNotFound { address: String },

    /// A pool with this address is already registered
    #[error("Pool already exists: {address}")]
    PoolAlreadyExists { address: String },

    /// A pool already exists for this unordered token pair
    #[error("A liquidity pool already exists for token pair ({token_a}, {token_b})")]
    TokenPairAlreadyExists { token_a: String, token_b: String },

    /// Referenced mint is not in the token registry
    #[error("Token not found: {mint}")]
    TokenNotFound { mint: String },

    /// A token with this mint is already registered
    #[error("Token already exists: {mint}")]
    TokenAlreadyExists { mint: String },

    /// Token launch field failed validation
    #[error("Invalid token {field}: {reason}")]
    InvalidTokenMetadata { field: &'static str, reason: String },

    /// Non-positive, NaN or infinite numeric input
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    /// Reserve or LP supply value outside the non-negative domain
    #[error("Invalid reserve for {field}: {value}")]
    InvalidReserve { field: &'static str, value: String },

    /// Quote produced zero output, the action cannot proceed
    #[error("Insufficient liquidity in pool")]
    InsufficientLiquidity,

    /// Optimistic version check failed at the ledger boundary
    #[error("Stale reserves for pool {address}: expected version {expected}, found {actual}")]
    StaleReserveConflict {
        address: String,
        expected: u64,
        actual: u64,
    },

    /// Deposit amounts deviate from the pool ratio by more than the tolerance
    #[error("Deposit ratio mismatch: expected amount_b {expected}, got {actual} (deviation {deviation_percent}%)")]
    DepositRatioMismatch {
        expected: Decimal,
        actual: Decimal,
        deviation_percent: Decimal,
    },

    /// Both sides of a pair refer to the same mint
    #[error("Token pair requires two distinct mints, got {mint} twice")]
    IdenticalMints { mint: String },

    /// Empty or malformed identifier
    #[error("Invalid {kind}: {reason}")]
    InvalidIdentifier { kind: &'static str, reason: String },

    /// Unknown chart window label
    #[error("Invalid time range '{0}', expected one of 1H, 24H, 7D, 30D, ALL")]
    InvalidTimeRange(String),
}

impl AmmError {
    /// Shorthand for [`AmmError::InvalidAmount`]
    pub fn invalid_amount(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            field,
            reason: reason.into(),
        }
    }

    /// True for conflicts a caller may resolve by re-reading and retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleReserveConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, AmmError>;
