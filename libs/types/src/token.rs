//! Launched token records
//!
//! A token must be registered before any pool can trade it.

use crate::common::{AmmError, TokenMint, TxSignature, WalletAddress, AMOUNT_SCALE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Highest mint precision a launch may declare
pub const MAX_TOKEN_DECIMALS: u8 = AMOUNT_SCALE as u8;

/// Optional project links shown next to a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLinks {
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
}

impl TokenLinks {
    /// Every present link must be an absolute http(s) URL
    pub fn validate(&self) -> Result<(), AmmError> {
        for (field, link) in [
            ("website", &self.website),
            ("twitter", &self.twitter),
            ("telegram", &self.telegram),
            ("discord", &self.discord),
        ] {
            let Some(link) = link else { continue };
            let parsed = Url::parse(link).map_err(|e| AmmError::InvalidTokenMetadata {
                field,
                reason: format!("'{}' is not a valid URL: {}", link, e),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AmmError::InvalidTokenMetadata {
                    field,
                    reason: format!("'{}' must use http or https", link),
                });
            }
        }
        Ok(())
    }
}

/// Launch request for a mint that already exists on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewToken {
    pub mint: TokenMint,
    pub creator_wallet: WalletAddress,
    pub name: String,
    pub symbol: String,
    pub image_url: String,
    pub description: Option<String>,
    /// Whole-token supply minted at launch
    pub supply: u64,
    pub decimals: u8,
    pub links: TokenLinks,
    pub tx_signature: Option<TxSignature>,
}

impl NewToken {
    pub fn validate(&self) -> Result<(), AmmError> {
        for (field, value) in [
            ("name", &self.name),
            ("symbol", &self.symbol),
            ("image_url", &self.image_url),
        ] {
            if value.trim().is_empty() {
                return Err(AmmError::InvalidTokenMetadata {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.supply == 0 {
            return Err(AmmError::InvalidTokenMetadata {
                field: "supply",
                reason: "must be positive".to_string(),
            });
        }
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(AmmError::InvalidTokenMetadata {
                field: "decimals",
                reason: format!("{} exceeds {}", self.decimals, MAX_TOKEN_DECIMALS),
            });
        }
        self.links.validate()
    }

    /// Registry record for this launch, stamped at `created_at`
    pub fn into_token(self, created_at: DateTime<Utc>) -> Token {
        Token {
            mint: self.mint,
            creator_wallet: self.creator_wallet,
            name: self.name,
            symbol: self.symbol,
            image_url: self.image_url,
            description: self.description,
            supply: self.supply,
            decimals: self.decimals,
            links: self.links,
            tx_signature: self.tx_signature,
            created_at,
        }
    }
}

/// Registered token as held by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub mint: TokenMint,
    pub creator_wallet: WalletAddress,
    pub name: String,
    pub symbol: String,
    pub image_url: String,
    pub description: Option<String>,
    pub supply: u64,
    pub decimals: u8,
    pub links: TokenLinks,
    pub tx_signature: Option<TxSignature>,
    pub created_at: DateTime<Utc>,
}
