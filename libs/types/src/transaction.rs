//! User activity log entries (swaps, liquidity changes, launches)

use crate::common::{PoolAddress, TokenMint, TxSignature, WalletAddress};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default page size for wallet activity queries
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Default size of the global recent-activity feed
pub const DEFAULT_RECENT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Swap,
    Deposit,
    Withdraw,
    CreateToken,
    CreatePool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Confirmed,
}

/// Kind-specific payload of an activity entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionDetails {
    Swap {
        token_in: TokenMint,
        token_out: TokenMint,
        amount_in: Decimal,
        amount_out: Decimal,
    },
    Liquidity {
        amount_a: Decimal,
        amount_b: Decimal,
        lp_amount: Decimal,
    },
    TokenLaunch {
        mint: TokenMint,
        name: String,
        symbol: String,
    },
    PoolLaunch {
        token_a: TokenMint,
        token_b: TokenMint,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: TxSignature,
    pub kind: TransactionKind,
    pub wallet: WalletAddress,
    pub pool_address: Option<PoolAddress>,
    pub details: TransactionDetails,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Filter and pagination for wallet activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub kind: Option<TransactionKind>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            kind: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl TransactionQuery {
    pub fn of_kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.kind.map_or(true, |kind| record.kind == kind)
    }
}

/// One page of wallet activity, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    pub total: usize,
    pub has_more: bool,
}

impl TransactionPage {
    /// Slice an already filtered, newest-first list
    pub fn paginate(matching: Vec<TransactionRecord>, query: &TransactionQuery) -> Self {
        let total = matching.len();
        let transactions: Vec<_> = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        let has_more = query.offset + transactions.len() < total;
        Self {
            transactions,
            total,
            has_more,
        }
    }
}
