//! In-memory pool ledger
//!
//! One `RwLock` per pool row serializes mutations of that pool while other
//! pools proceed in parallel. The row owns its price history so a commit
//! updates reserves and appends the point under the same write lock.

use crate::error::Result;
use crate::ledger::PoolLedger;
use amm::PricedPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{
    AmmError, Pool, PoolAddress, PriceHistoryPoint, Token, TokenMint, TokenPairKey, TransactionPage,
    TransactionQuery, TransactionRecord, WalletAddress,
};

/// A pool and everything appended to it
#[derive(Debug)]
struct PoolRow {
    pool: Pool,
    history: Vec<PriceHistoryPoint>,
}

/// Ledger counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_tokens: usize,
    pub total_pools: usize,
    pub commits: u64,
    pub stale_conflicts: u64,
    pub price_points: u64,
    pub transactions: u64,
}

/// Ledger backed by process memory
pub struct InMemoryLedger {
    /// Token registry indexed by mint
    tokens: DashMap<TokenMint, Token>,

    /// Mints in registration order
    token_order: RwLock<Vec<TokenMint>>,

    /// Pool rows indexed by address
    pools: DashMap<PoolAddress, Arc<RwLock<PoolRow>>>,

    /// Unordered pair -> pool address; the mutex makes check-and-insert atomic
    pair_index: Mutex<HashMap<TokenPairKey, PoolAddress>>,

    /// Pool addresses in insertion order
    creation_order: RwLock<Vec<PoolAddress>>,

    /// Activity log in insertion order
    transactions: RwLock<Vec<TransactionRecord>>,

    /// Last sequence number handed to a price point
    sequence: AtomicU64,

    stats: RwLock<LedgerStats>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
            token_order: RwLock::new(Vec::new()),
            pools: DashMap::new(),
            pair_index: Mutex::new(HashMap::new()),
            creation_order: RwLock::new(Vec::new()),
            transactions: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(0),
            stats: RwLock::new(LedgerStats::default()),
        }
    }

    pub fn stats(&self) -> LedgerStats {
        self.stats.read().clone()
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn row(&self, address: &PoolAddress) -> Result<Arc<RwLock<PoolRow>>> {
        self.pools
            .get(address)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                AmmError::PoolNotFound {
                    address: address.to_string(),
                }
                .into()
            })
    }

    /// Swap the row's pool for `pool` if the stored version matches
    fn compare_and_swap(&self, row: &mut PoolRow, mut pool: Pool, expected_version: u64) -> Result<Pool> {
        let actual = row.pool.version;
        if actual != expected_version {
            self.stats.write().stale_conflicts += 1;
            warn!(
                pool = %row.pool.address,
                expected = expected_version,
                actual,
                "Rejected pool write with stale version"
            );
            return Err(AmmError::StaleReserveConflict {
                address: row.pool.address.to_string(),
                expected: expected_version,
                actual,
            }
            .into());
        }

        pool.reserves.check_non_negative()?;
        // Reserves whose price overflows are never stored
        pool.spot_price()?;
        pool.version = expected_version + 1;
        row.pool = pool.clone();
        self.stats.write().commits += 1;
        Ok(pool)
    }

    fn push_point(&self, row: &mut PoolRow, mut point: PriceHistoryPoint) -> PriceHistoryPoint {
        point.sequence = self.next_sequence();
        row.history.push(point.clone());
        self.stats.write().price_points += 1;
        point
    }

    fn tokens_newest_first(&self, filter: impl Fn(&Token) -> bool) -> Vec<Token> {
        let order = self.token_order.read();
        order
            .iter()
            .rev()
            .filter_map(|mint| self.tokens.get(mint).map(|entry| entry.value().clone()))
            .filter(|token| filter(token))
            .collect()
    }

    fn pools_newest_first(&self, filter: impl Fn(&Pool) -> bool) -> Vec<Pool> {
        let order = self.creation_order.read();
        order
            .iter()
            .rev()
            .filter_map(|address| {
                let row = self.pools.get(address).map(|entry| Arc::clone(entry.value()))?;
                let pool = row.read().pool.clone();
                Some(pool)
            })
            .filter(|pool| filter(pool))
            .collect()
    }

    /// Records matching `filter`, newest first (ties keep the later insert first)
    fn records_newest_first(&self, filter: impl Fn(&TransactionRecord) -> bool) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .transactions
            .read()
            .iter()
            .rev()
            .filter(|record| filter(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}

#[async_trait]
impl PoolLedger for InMemoryLedger {
    async fn insert_token(&self, token: Token) -> Result<Token> {
        match self.tokens.entry(token.mint.clone()) {
            Entry::Occupied(_) => {
                warn!(mint = %token.mint, "Rejected duplicate token registration");
                return Err(AmmError::TokenAlreadyExists {
                    mint: token.mint.to_string(),
                }
                .into());
            }
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
            }
        }
        // Shard lock is released before the order lock is taken
        self.token_order.write().push(token.mint.clone());

        let mut stats = self.stats.write();
        stats.total_tokens = self.tokens.len();
        info!(mint = %token.mint, symbol = %token.symbol, total_tokens = stats.total_tokens, "Token registered");
        Ok(token)
    }

    async fn get_token(&self, mint: &TokenMint) -> Result<Token> {
        self.tokens
            .get(mint)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                AmmError::TokenNotFound {
                    mint: mint.to_string(),
                }
                .into()
            })
    }

    async fn list_tokens(&self) -> Result<Vec<Token>> {
        Ok(self.tokens_newest_first(|_| true))
    }

    async fn list_tokens_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Token>> {
        Ok(self.tokens_newest_first(|token| &token.creator_wallet == wallet))
    }

    async fn get_pool(&self, address: &PoolAddress) -> Result<Pool> {
        let row = self.row(address)?;
        let pool = row.read().pool.clone();
        Ok(pool)
    }

    async fn find_pool_by_pair(
        &self,
        mint_x: &TokenMint,
        mint_y: &TokenMint,
    ) -> Result<Option<Pool>> {
        let key = TokenPairKey::new(mint_x, mint_y)?;
        let address = self.pair_index.lock().get(&key).cloned();
        match address {
            Some(address) => Ok(Some(self.get_pool(&address).await?)),
            None => Ok(None),
        }
    }

    async fn list_pools(&self) -> Result<Vec<Pool>> {
        Ok(self.pools_newest_first(|_| true))
    }

    async fn list_pools_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Pool>> {
        Ok(self.pools_newest_first(|pool| &pool.creator_wallet == wallet))
    }

    async fn insert_pool(&self, pool: Pool, init_point: PriceHistoryPoint) -> Result<Pool> {
        let key = pool.pair_key()?;
        pool.reserves.check_non_negative()?;
        // Reserves whose price overflows are never stored
        pool.spot_price()?;

        let mut pairs = self.pair_index.lock();
        if pairs.contains_key(&key) {
            warn!(pair = %key, "Rejected pool for an existing token pair");
            return Err(AmmError::TokenPairAlreadyExists {
                token_a: pool.token_a_mint.to_string(),
                token_b: pool.token_b_mint.to_string(),
            }
            .into());
        }
        if self.pools.contains_key(&pool.address) {
            return Err(AmmError::PoolAlreadyExists {
                address: pool.address.to_string(),
            }
            .into());
        }

        let address = pool.address.clone();
        let mut row = PoolRow {
            pool: pool.clone(),
            history: Vec::new(),
        };
        self.push_point(&mut row, init_point);

        self.pools.insert(address.clone(), Arc::new(RwLock::new(row)));
        pairs.insert(key, address.clone());
        self.creation_order.write().push(address.clone());
        drop(pairs);

        let mut stats = self.stats.write();
        stats.total_pools = self.pools.len();
        info!(pool = %address, total_pools = stats.total_pools, "Pool registered");
        Ok(pool)
    }

    async fn put_pool(&self, pool: Pool, expected_version: u64) -> Result<Pool> {
        let row = self.row(&pool.address)?;
        let mut guard = row.write();
        self.compare_and_swap(&mut guard, pool, expected_version)
    }

    async fn commit(
        &self,
        pool: Pool,
        expected_version: u64,
        point: PriceHistoryPoint,
    ) -> Result<(Pool, PriceHistoryPoint)> {
        let row = self.row(&pool.address)?;
        let mut guard = row.write();
        let stored = self.compare_and_swap(&mut guard, pool, expected_version)?;
        let point = self.push_point(&mut guard, point);
        debug!(
            pool = %stored.address,
            version = stored.version,
            sequence = point.sequence,
            "Committed pool state"
        );
        Ok((stored, point))
    }

    async fn append_price_history(&self, point: PriceHistoryPoint) -> Result<PriceHistoryPoint> {
        let row = self.row(&point.pool_address)?;
        let mut guard = row.write();
        Ok(self.push_point(&mut guard, point))
    }

    async fn list_price_history(
        &self,
        address: &PoolAddress,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceHistoryPoint>> {
        let row = self.row(address)?;
        let mut points: Vec<PriceHistoryPoint> = row
            .read()
            .history
            .iter()
            .filter(|point| point.timestamp >= since)
            .cloned()
            .collect();
        points.sort_by_key(|point| (point.timestamp, point.sequence));
        Ok(points)
    }

    async fn record_transaction(&self, record: TransactionRecord) -> Result<()> {
        debug!(signature = %record.signature, kind = ?record.kind, "Recording transaction");
        self.transactions.write().push(record);
        self.stats.write().transactions += 1;
        Ok(())
    }

    async fn transactions_by_wallet(
        &self,
        wallet: &WalletAddress,
        query: TransactionQuery,
    ) -> Result<TransactionPage> {
        let matching =
            self.records_newest_first(|record| &record.wallet == wallet && query.matches(record));
        Ok(TransactionPage::paginate(matching, &query))
    }

    async fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        let mut records = self.records_newest_first(|_| true);
        records.truncate(limit);
        Ok(records)
    }
}
