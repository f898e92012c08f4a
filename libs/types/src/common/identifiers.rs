//! Typed string identifiers for pools, mints, wallets and signatures
//!
//! Addresses are opaque to the engine (base58 public keys in practice); the
//! wrappers only guarantee they are non-empty and keep them from being mixed
//! up in function signatures.

use crate::common::errors::AmmError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro for defining non-empty string identifiers
///
/// Each identifier gets validated construction, `Display`, `FromStr`,
/// `AsRef<str>` and transparent serde.
macro_rules! define_address {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated identifier
            pub fn new(value: impl Into<String>) -> Result<Self, AmmError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(AmmError::InvalidIdentifier {
                        kind: $kind,
                        reason: "must not be empty".to_string(),
                    });
                }
                if trimmed.len() != value.len() {
                    return Err(AmmError::InvalidIdentifier {
                        kind: $kind,
                        reason: format!("'{}' has surrounding whitespace", value),
                    });
                }
                Ok(Self(value))
            }

            /// Borrow the raw address string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Extract the raw address string
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = AmmError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = AmmError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

define_address!(
    /// Address of a liquidity pool account
    PoolAddress, "pool address"
);

define_address!(
    /// Mint address of a fungible token
    TokenMint, "token mint"
);

define_address!(
    /// Wallet identity of a user (creator, trader, liquidity provider)
    WalletAddress, "wallet address"
);

define_address!(
    /// Identifier of a finalized on-chain transaction
    TxSignature, "transaction signature"
);

define_address!(
    /// Auxiliary account address (LP mint, reserve vaults); never interpreted
    AccountAddress, "account address"
);

/// Unordered token pair key
///
/// `(X, Y)` and `(Y, X)` produce the same key, which is what makes a pool
/// unique per pair regardless of the A/B assignment chosen at creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenPairKey {
    low: TokenMint,
    high: TokenMint,
}

impl TokenPairKey {
    pub fn new(x: &TokenMint, y: &TokenMint) -> Result<Self, AmmError> {
        if x == y {
            return Err(AmmError::IdenticalMints {
                mint: x.to_string(),
            });
        }
        let (low, high) = if x < y { (x, y) } else { (y, x) };
        Ok(Self {
            low: low.clone(),
            high: high.clone(),
        })
    }

    pub fn low(&self) -> &TokenMint {
        &self.low
    }

    pub fn high(&self) -> &TokenMint {
        &self.high
    }

    pub fn contains(&self, mint: &TokenMint) -> bool {
        &self.low == mint || &self.high == mint
    }
}

impl fmt::Display for TokenPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.low, self.high)
    }
}
