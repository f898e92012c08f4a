//! Persistence boundary for tokens, pools, price history and activity

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use types::{
    Pool, PoolAddress, PriceHistoryPoint, Token, TokenMint, TransactionPage, TransactionQuery,
    TransactionRecord, WalletAddress,
};

/// Durable store of launched tokens, pool rows, price history and user activity
///
/// Every reserve mutation goes through [`PoolLedger::commit`], a
/// compare-and-swap on the pool's `version` that also appends the matching
/// price point. A stale version fails with
/// [`types::AmmError::StaleReserveConflict`] and leaves the row untouched.
#[async_trait]
pub trait PoolLedger: Send + Sync {
    /// Register a launched token, failing with `TokenAlreadyExists` on a known mint
    async fn insert_token(&self, token: Token) -> Result<Token>;

    /// Fetch one token, failing with `TokenNotFound`
    async fn get_token(&self, mint: &TokenMint) -> Result<Token>;

    /// All tokens, newest first
    async fn list_tokens(&self) -> Result<Vec<Token>>;

    /// Tokens launched by one wallet, newest first
    async fn list_tokens_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Token>>;

    /// Fetch one pool, failing with `PoolNotFound`
    async fn get_pool(&self, address: &PoolAddress) -> Result<Pool>;

    /// Pool for an unordered mint pair, if any
    async fn find_pool_by_pair(&self, mint_x: &TokenMint, mint_y: &TokenMint)
        -> Result<Option<Pool>>;

    /// All pools, newest first
    async fn list_pools(&self) -> Result<Vec<Pool>>;

    /// Pools created by one wallet, newest first
    async fn list_pools_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Pool>>;

    /// Register a new pool together with its `init` price point
    ///
    /// Pair uniqueness is checked atomically with the insert.
    async fn insert_pool(&self, pool: Pool, init_point: PriceHistoryPoint) -> Result<Pool>;

    /// Replace a pool row if its stored version still equals `expected_version`
    ///
    /// Returns the stored row with its version bumped.
    async fn put_pool(&self, pool: Pool, expected_version: u64) -> Result<Pool>;

    /// [`PoolLedger::put_pool`] and [`PoolLedger::append_price_history`] as one step
    async fn commit(
        &self,
        pool: Pool,
        expected_version: u64,
        point: PriceHistoryPoint,
    ) -> Result<(Pool, PriceHistoryPoint)>;

    /// Append a price point, assigning its sequence number
    async fn append_price_history(&self, point: PriceHistoryPoint) -> Result<PriceHistoryPoint>;

    /// Points of one pool at or after `since`, ascending
    async fn list_price_history(
        &self,
        address: &PoolAddress,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceHistoryPoint>>;

    async fn record_transaction(&self, record: TransactionRecord) -> Result<()>;

    /// One wallet's activity, newest first
    async fn transactions_by_wallet(
        &self,
        wallet: &WalletAddress,
        query: TransactionQuery,
    ) -> Result<TransactionPage>;

    /// Latest activity across all wallets, newest first
    async fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>>;
}
