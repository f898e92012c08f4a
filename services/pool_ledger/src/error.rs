//! Pool ledger and service errors

use rust_decimal::Decimal;
use thiserror::Error;
use types::AmmError;

/// Errors raised by the ledger and the service layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error("LP amount {requested} exceeds caller balance {balance}")]
    InsufficientLpBalance { requested: Decimal, balance: Decimal },

    #[error("Slippage exceeded: settled output {received} is below minimum {minimum}")]
    SlippageExceeded { received: Decimal, minimum: Decimal },

    #[error("Gave up committing pool {address} after {attempts} attempts")]
    RetriesExhausted { address: String, attempts: u32 },

    #[error("Settlement failed: {0}")]
    Settlement(String),
}

impl LedgerError {
    /// True for version conflicts worth a re-read and retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Amm(err) if err.is_retryable())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
