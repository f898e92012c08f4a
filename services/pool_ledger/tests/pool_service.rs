//! Pool service integration tests against the in-memory ledger

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use launchpad_config::EngineSettings;
use pool_ledger::{
    DepositRequest, InMemoryLedger, LedgerError, PoolLedger, PoolService, SimulatedSettlement,
    SwapRequest, WithdrawRequest,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use amm::{TimeRange, WithdrawBasis};
use types::{
    AccountAddress, AmmError, NewPool, NewToken, Pool, PoolAddress, PriceEventKind,
    PriceHistoryPoint, SwapDirection, Token, TokenLinks, TokenMint, TransactionKind, TransactionPage, TransactionQuery,
    TransactionRecord, TxSignature, WalletAddress,
};

type Service<L> = PoolService<L, SimulatedSettlement>;

fn wallet(value: &str) -> WalletAddress {
    WalletAddress::new(value).unwrap()
}

fn mint(value: &str) -> TokenMint {
    TokenMint::new(value).unwrap()
}

fn new_pool(address: &str, token_a: &str, token_b: &str, amount_a: Decimal, amount_b: Decimal) -> NewPool {
    NewPool {
        address: PoolAddress::new(address).unwrap(),
        token_a_mint: mint(token_a),
        token_b_mint: mint(token_b),
        lp_mint: AccountAddress::new(format!("{}-lp", address)).unwrap(),
        vault_a: AccountAddress::new(format!("{}-vault-a", address)).unwrap(),
        vault_b: AccountAddress::new(format!("{}-vault-b", address)).unwrap(),
        initial_amount_a: amount_a,
        initial_amount_b: amount_b,
        creator_wallet: wallet("creator"),
        tx_signature: Some(TxSignature::new(format!("{}-create", address)).unwrap()),
    }
}

/// Mints every pool test trades, registered up front without activity entries
const LISTED_MINTS: [&str; 6] = ["mintA", "mintB", "mintX", "mintY", "mintP", "mintQ"];

fn new_token(mint_value: &str, creator: &str, signature: Option<&str>) -> NewToken {
    NewToken {
        mint: mint(mint_value),
        creator_wallet: wallet(creator),
        name: format!("{} token", mint_value),
        symbol: mint_value.to_uppercase(),
        image_url: format!("https://example.org/{}.png", mint_value),
        description: None,
        supply: 1_000_000_000,
        decimals: 9,
        links: TokenLinks::default(),
        tx_signature: signature.map(|sig| TxSignature::new(sig).unwrap()),
    }
}

async fn list_tokens<L: PoolLedger>(service: &Service<L>) {
    for mint_value in LISTED_MINTS {
        service
            .create_token(new_token(mint_value, "issuer", None))
            .await
            .unwrap();
    }
}

async fn service_with(settings: EngineSettings) -> (Arc<InMemoryLedger>, Service<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let service = PoolService::new(
        Arc::clone(&ledger),
        Arc::new(SimulatedSettlement::new()),
        settings,
    )
    .unwrap();
    list_tokens(&service).await;
    (ledger, service)
}

async fn service() -> (Arc<InMemoryLedger>, Service<InMemoryLedger>) {
    service_with(EngineSettings::default()).await
}

fn swap_request(pool: &Pool, amount_in: Decimal) -> SwapRequest {
    SwapRequest {
        pool: pool.address.clone(),
        wallet: wallet("trader"),
        amount_in,
        direction: SwapDirection::AToB,
        slippage_percent: None,
    }
}

async fn history(service: &Service<InMemoryLedger>, pool: &Pool) -> Vec<PriceHistoryPoint> {
    service
        .ledger()
        .list_price_history(&pool.address, DateTime::<Utc>::MIN_UTC)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_pool_mints_geometric_mean() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(100), dec!(400)))
        .await
        .unwrap();

    assert_eq!(pool.reserves.lp_total_supply, dec!(200));
    assert_eq!(pool.version, 0);

    let points = history(&service, &pool).await;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].kind, PriceEventKind::Init);
    assert_eq!(points[0].price, dec!(4));

    let page = service
        .transactions_by_wallet(&wallet("creator"), TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.transactions[0].kind, TransactionKind::CreatePool);
}

#[tokio::test]
async fn test_create_pool_rejects_duplicate_pair_and_bad_input() {
    let (_, service) = service().await;
    service
        .create_pool(new_pool("pool1", "mintX", "mintY", dec!(100), dec!(400)))
        .await
        .unwrap();

    let err = service
        .create_pool(new_pool("pool2", "mintY", "mintX", dec!(5), dec!(5)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Amm(AmmError::TokenPairAlreadyExists { .. })
    ));

    let err = service
        .create_pool(new_pool("pool3", "mintZ", "mintZ", dec!(5), dec!(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Amm(AmmError::IdenticalMints { .. })));

    let err = service
        .create_pool(new_pool("pool4", "mintP", "mintQ", dec!(0), dec!(5)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Amm(AmmError::InvalidAmount { field: "amount_a", .. })
    ));

    assert_eq!(service.pools().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_pool_requires_registered_tokens() {
    let (ledger, service) = service().await;

    let err = service
        .create_pool(new_pool("pool1", "mintA", "unlisted", dec!(100), dec!(400)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Amm(AmmError::TokenNotFound {
            mint: "unlisted".to_string()
        })
    );
    assert!(service.pools().await.unwrap().is_empty());
    assert_eq!(ledger.stats().price_points, 0);

    service
        .create_token(new_token("unlisted", "creator", Some("unlisted-launch")))
        .await
        .unwrap();
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "unlisted", dec!(100), dec!(400)))
        .await
        .unwrap();
    assert_eq!(pool.token_b_mint, mint("unlisted"));
}

#[tokio::test]
async fn test_token_launches() {
    let (_, service) = service().await;
    service
        .create_token(new_token("alphaMint", "creator", Some("alpha-launch")))
        .await
        .unwrap();
    service
        .create_token(new_token("betaMint", "creator", None))
        .await
        .unwrap();

    let err = service
        .create_token(new_token("alphaMint", "someone", None))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Amm(AmmError::TokenAlreadyExists { .. })));

    let mut bad_link = new_token("gammaMint", "creator", None);
    bad_link.links.website = Some("alpha dot com".to_string());
    assert!(matches!(
        service.create_token(bad_link).await,
        Err(LedgerError::Amm(AmmError::InvalidTokenMetadata { field: "website", .. }))
    ));

    let mine: Vec<String> = service
        .tokens_by_creator(&wallet("creator"))
        .await
        .unwrap()
        .into_iter()
        .map(|token| token.mint.into_inner())
        .collect();
    assert_eq!(mine, vec!["betaMint", "alphaMint"]);
    assert_eq!(service.token(&mint("alphaMint")).await.unwrap().decimals, 9);
    assert_eq!(service.tokens().await.unwrap().len(), LISTED_MINTS.len() + 2);

    // Only the signed launch lands in the activity feed
    let activity = service
        .transactions_by_wallet(&wallet("creator"), TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(activity.total, 1);
    assert_eq!(activity.transactions[0].kind, TransactionKind::CreateToken);
}

#[tokio::test]
async fn test_swap_updates_reserves_history_and_activity() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();

    let preview = service
        .quote_swap(&pool.address, dec!(100), SwapDirection::AToB)
        .await
        .unwrap();
    assert_eq!(preview.quote.fee, dec!(0.3));
    assert_eq!(preview.quote.amount_out, dec!(90.661089388));
    assert!(preview.high_impact);
    assert_eq!(preview.token_in, mint("mintA"));

    let receipt = service.swap(swap_request(&pool, dec!(100))).await.unwrap();
    assert_eq!(receipt.settlement.amount_out, dec!(90.661089388));
    assert_eq!(receipt.pool.reserves.reserve_a, dec!(1100));
    assert_eq!(receipt.pool.reserves.reserve_b, dec!(909.338910612));
    assert_eq!(receipt.pool.reserves.lp_total_supply, dec!(1000));
    assert_eq!(receipt.pool.version, 1);

    let points = history(&service, &pool).await;
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].kind, PriceEventKind::Swap);
    assert_eq!(points[1].price, dec!(909.338910612) / dec!(1100));
    assert!(points[1].sequence > points[0].sequence);

    let trades = service
        .transactions_by_wallet(&wallet("trader"), TransactionQuery::of_kind(TransactionKind::Swap))
        .await
        .unwrap();
    assert_eq!(trades.total, 1);
}

#[tokio::test]
async fn test_zero_output_swap_is_rejected() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();

    let preview = service
        .quote_swap(&pool.address, dec!(0.000000001), SwapDirection::AToB)
        .await
        .unwrap();
    assert!(preview.quote.is_insufficient_liquidity());

    let err = service
        .swap(swap_request(&pool, dec!(0.000000001)))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::Amm(AmmError::InsufficientLiquidity));
    assert_eq!(history(&service, &pool).await.len(), 1);
}

#[tokio::test]
async fn test_slippage_rejection_leaves_pool_untouched() {
    let ledger = Arc::new(InMemoryLedger::new());
    let service = PoolService::new(
        Arc::clone(&ledger),
        Arc::new(SimulatedSettlement::with_output_shortfall(dec!(1)).unwrap()),
        EngineSettings::default(),
    )
    .unwrap();
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();

    let err = service.swap(swap_request(&pool, dec!(10))).await.unwrap_err();
    assert!(matches!(err, LedgerError::SlippageExceeded { .. }));

    // A wider tolerance accepts the same shortfall
    let mut tolerant = swap_request(&pool, dec!(10));
    tolerant.slippage_percent = Some(dec!(2));
    assert!(service.swap(tolerant).await.is_ok());

    let stored = service.pool(&pool.address).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(ledger.stats().price_points, 2);
}

#[tokio::test]
async fn test_deposit_mints_proportional_shares() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();
    assert_eq!(pool.reserves.lp_total_supply, dec!(2000));

    let preview = service
        .quote_deposit(&pool.address, dec!(100), None)
        .await
        .unwrap();
    assert_eq!(preview.amount_b, dec!(400));

    let receipt = service
        .add_liquidity(DepositRequest {
            pool: pool.address.clone(),
            wallet: wallet("provider"),
            amount_a: dec!(100),
            amount_b: dec!(400),
        })
        .await
        .unwrap();

    assert_eq!(receipt.change.lp_minted, dec!(200));
    assert_eq!(receipt.pool.reserves.lp_total_supply, dec!(2200));
    assert_eq!(receipt.pool.reserves.reserve_a, dec!(1100));
    assert_eq!(receipt.pool.reserves.reserve_b, dec!(4400));
    assert_eq!(receipt.price_point.kind, PriceEventKind::Deposit);
    assert_eq!(receipt.price_point.price, dec!(4));
}

#[tokio::test]
async fn test_deposit_ratio_tolerance() {
    let (_, service) = service_with(EngineSettings {
        deposit_ratio_tolerance_percent: Some(1.0),
        ..EngineSettings::default()
    })
    .await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();

    let err = service
        .add_liquidity(DepositRequest {
            pool: pool.address.clone(),
            wallet: wallet("provider"),
            amount_a: dec!(100),
            amount_b: dec!(500),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Amm(AmmError::DepositRatioMismatch { .. })
    ));
}

#[tokio::test]
async fn test_withdraw_against_caller_balance() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();

    let receipt = service
        .withdraw_liquidity(WithdrawRequest {
            pool: pool.address.clone(),
            wallet: wallet("creator"),
            lp_amount: dec!(500),
            caller_lp_balance: dec!(2000),
        })
        .await
        .unwrap();

    assert_eq!(receipt.change.amount_a, dec!(250));
    assert_eq!(receipt.change.amount_b, dec!(1000));
    assert_eq!(receipt.pool.reserves.reserve_a, dec!(750));
    assert_eq!(receipt.pool.reserves.reserve_b, dec!(3000));
    assert_eq!(receipt.pool.reserves.lp_total_supply, dec!(1500));
    assert_eq!(receipt.price_point.kind, PriceEventKind::Withdraw);

    let err = service
        .withdraw_liquidity(WithdrawRequest {
            pool: pool.address.clone(),
            wallet: wallet("creator"),
            lp_amount: dec!(10),
            caller_lp_balance: dec!(5),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientLpBalance {
            requested: dec!(10),
            balance: dec!(5),
        }
    );
}

#[tokio::test]
async fn test_deposit_into_pool_without_lp_supply_is_rejected() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();

    // Burning the whole supply against a larger claimed balance strands half the reserves
    let drained = service
        .withdraw_liquidity(WithdrawRequest {
            pool: pool.address.clone(),
            wallet: wallet("creator"),
            lp_amount: dec!(2000),
            caller_lp_balance: dec!(4000),
        })
        .await
        .unwrap();
    assert_eq!(drained.pool.reserves.lp_total_supply, Decimal::ZERO);
    assert_eq!(drained.pool.reserves.reserve_a, dec!(500));

    let err = service
        .add_liquidity(DepositRequest {
            pool: pool.address.clone(),
            wallet: wallet("provider"),
            amount_a: dec!(100),
            amount_b: dec!(400),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Amm(AmmError::InvalidAmount { field: "amount_a", .. })
    ));

    let stored = service.pool(&pool.address).await.unwrap();
    assert_eq!(stored.version, drained.pool.version);
    assert_eq!(stored.reserves.reserve_a, dec!(500));
}

#[tokio::test]
async fn test_withdraw_against_total_supply() {
    let (_, service) = service_with(EngineSettings {
        withdraw_basis: WithdrawBasis::TotalSupply,
        ..EngineSettings::default()
    })
    .await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();

    let preview = service
        .quote_withdraw(&pool.address, dec!(500), dec!(1000))
        .await
        .unwrap();
    assert_eq!(preview.amount_a, dec!(250));
    assert_eq!(preview.amount_b, dec!(1000));
    assert_eq!(preview.new_lp_supply(), dec!(1500));
}

/// Ledger wrapper that lets a competing writer land right before commits
struct ContendedLedger {
    inner: InMemoryLedger,
    contention: AtomicU32,
}

impl ContendedLedger {
    fn new(contention: u32) -> Self {
        Self {
            inner: InMemoryLedger::new(),
            contention: AtomicU32::new(contention),
        }
    }
}

#[async_trait]
impl PoolLedger for ContendedLedger {
    async fn insert_token(&self, token: Token) -> pool_ledger::Result<Token> {
        self.inner.insert_token(token).await
    }

    async fn get_token(&self, mint: &TokenMint) -> pool_ledger::Result<Token> {
        self.inner.get_token(mint).await
    }

    async fn list_tokens(&self) -> pool_ledger::Result<Vec<Token>> {
        self.inner.list_tokens().await
    }

    async fn list_tokens_by_creator(&self, wallet: &WalletAddress) -> pool_ledger::Result<Vec<Token>> {
        self.inner.list_tokens_by_creator(wallet).await
    }

    async fn get_pool(&self, address: &PoolAddress) -> pool_ledger::Result<Pool> {
        self.inner.get_pool(address).await
    }

    async fn find_pool_by_pair(
        &self,
        mint_x: &TokenMint,
        mint_y: &TokenMint,
    ) -> pool_ledger::Result<Option<Pool>> {
        self.inner.find_pool_by_pair(mint_x, mint_y).await
    }

    async fn list_pools(&self) -> pool_ledger::Result<Vec<Pool>> {
        self.inner.list_pools().await
    }

    async fn list_pools_by_creator(&self, wallet: &WalletAddress) -> pool_ledger::Result<Vec<Pool>> {
        self.inner.list_pools_by_creator(wallet).await
    }

    async fn insert_pool(&self, pool: Pool, init_point: PriceHistoryPoint) -> pool_ledger::Result<Pool> {
        self.inner.insert_pool(pool, init_point).await
    }

    async fn put_pool(&self, pool: Pool, expected_version: u64) -> pool_ledger::Result<Pool> {
        self.inner.put_pool(pool, expected_version).await
    }

    async fn commit(
        &self,
        pool: Pool,
        expected_version: u64,
        point: PriceHistoryPoint,
    ) -> pool_ledger::Result<(Pool, PriceHistoryPoint)> {
        if self
            .contention
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            let mut competing = self.inner.get_pool(&pool.address).await?;
            let version = competing.version;
            competing.reserves.reserve_a += dec!(100);
            self.inner.put_pool(competing, version).await?;
        }
        self.inner.commit(pool, expected_version, point).await
    }

    async fn append_price_history(&self, point: PriceHistoryPoint) -> pool_ledger::Result<PriceHistoryPoint> {
        self.inner.append_price_history(point).await
    }

    async fn list_price_history(
        &self,
        address: &PoolAddress,
        since: DateTime<Utc>,
    ) -> pool_ledger::Result<Vec<PriceHistoryPoint>> {
        self.inner.list_price_history(address, since).await
    }

    async fn record_transaction(&self, record: TransactionRecord) -> pool_ledger::Result<()> {
        self.inner.record_transaction(record).await
    }

    async fn transactions_by_wallet(
        &self,
        wallet: &WalletAddress,
        query: TransactionQuery,
    ) -> pool_ledger::Result<TransactionPage> {
        self.inner.transactions_by_wallet(wallet, query).await
    }

    async fn recent_transactions(&self, limit: usize) -> pool_ledger::Result<Vec<TransactionRecord>> {
        self.inner.recent_transactions(limit).await
    }
}

async fn contended_service(contention: u32) -> (Arc<ContendedLedger>, Service<ContendedLedger>) {
    let ledger = Arc::new(ContendedLedger::new(contention));
    let service = PoolService::new(
        Arc::clone(&ledger),
        Arc::new(SimulatedSettlement::new()),
        EngineSettings::default(),
    )
    .unwrap();
    list_tokens(&service).await;
    (ledger, service)
}

#[tokio::test]
async fn test_stale_commit_reapplies_settled_swap() {
    let (ledger, service) = contended_service(1).await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();

    let receipt = service.swap(swap_request(&pool, dec!(100))).await.unwrap();

    // Competing writer moved reserve_a to 1100 before the swap landed
    assert_eq!(receipt.settlement.amount_out, dec!(90.661089388));
    assert_eq!(receipt.pool.reserves.reserve_a, dec!(1200));
    assert_eq!(receipt.pool.reserves.reserve_b, dec!(909.338910612));
    assert_eq!(receipt.pool.version, 2);
    assert_eq!(ledger.inner.stats().stale_conflicts, 1);
}

#[tokio::test]
async fn test_commit_gives_up_after_max_retries() {
    let (ledger, service) = contended_service(10).await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();

    let err = service.swap(swap_request(&pool, dec!(100))).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::RetriesExhausted {
            address: "pool1".to_string(),
            attempts: 4,
        }
    );

    let points = ledger
        .list_price_history(&pool.address, DateTime::<Utc>::MIN_UTC)
        .await
        .unwrap();
    assert_eq!(points.len(), 1);
}

#[tokio::test]
async fn test_stale_commit_recomputes_deposit_shares() {
    let (_, service) = contended_service(1).await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(1000), dec!(4000)))
        .await
        .unwrap();

    let receipt = service
        .add_liquidity(DepositRequest {
            pool: pool.address.clone(),
            wallet: wallet("provider"),
            amount_a: dec!(100),
            amount_b: dec!(400),
        })
        .await
        .unwrap();

    // Shares are minted against the fresh reserve_a of 1100
    assert_eq!(receipt.pool.reserves.reserve_a, dec!(1200));
    assert_eq!(receipt.change.lp_minted, dec!(181.818181818));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_swaps_serialize_per_pool() {
    let (ledger, service) = service_with(EngineSettings {
        max_commit_retries: 100,
        ..EngineSettings::default()
    })
    .await;
    let service = Arc::new(service);
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(100000), dec!(100000)))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let request = swap_request(&pool, dec!(10));
            tokio::spawn(async move { service.swap(request).await })
        })
        .collect();

    let receipts: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let paid_out: Decimal = receipts.iter().map(|r| r.settlement.amount_out).sum();
    let stored = service.pool(&pool.address).await.unwrap();
    assert_eq!(stored.reserves.reserve_a, dec!(100080));
    assert_eq!(stored.reserves.reserve_b, dec!(100000) - paid_out);
    assert_eq!(stored.version, 8);
    assert_eq!(ledger.stats().commits, 8);

    let points = history(&service, &pool).await;
    assert_eq!(points.len(), 9);
    let mut sequences: Vec<u64> = points.iter().map(|p| p.sequence).collect();
    sequences.sort_unstable();
    sequences.dedup();
    assert_eq!(sequences.len(), 9);
}

#[tokio::test]
async fn test_price_series_windows() {
    let (_, service) = service().await;
    let pool = service
        .create_pool(new_pool("pool1", "mintA", "mintB", dec!(100), dec!(400)))
        .await
        .unwrap();

    // Only the init point: no change yet
    let single = service.price_series(&pool.address, TimeRange::All).await.unwrap();
    assert_eq!(single.series.len(), 1);
    assert_eq!(single.price_change.value, Decimal::ZERO);
    assert_eq!(single.price_change.percent, Decimal::ZERO);
    assert_eq!(single.current_price, dec!(4));

    let receipt = service.swap(swap_request(&pool, dec!(10))).await.unwrap();
    let after = service.price_series(&pool.address, TimeRange::OneDay).await.unwrap();
    assert_eq!(after.series.len(), 2);
    assert_eq!(after.current_price, receipt.price_point.price);
    assert_eq!(after.price_change.value, receipt.price_point.price - dec!(4));
    assert!(after.price_change.percent < Decimal::ZERO);

    // Window that ended before the pool existed falls back to live reserves
    let past = service
        .price_series_at(&pool.address, TimeRange::OneHour, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert!(past.series.is_empty());
    assert_eq!(past.current_price, receipt.pool.reserves.reserve_b / receipt.pool.reserves.reserve_a);

    let missing = PoolAddress::new("ghost").unwrap();
    assert!(matches!(
        service.price_series(&missing, TimeRange::All).await,
        Err(LedgerError::Amm(AmmError::PoolNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_activity_feed() {
    let (_, service) = service().await;
    let launch = service
        .create_token(new_token("mintAlpha", "creator", Some("launch-sig")))
        .await
        .unwrap();
    assert_eq!(launch.symbol, "MINTALPHA");

    let pool = service
        .create_pool(new_pool("pool1", "mintAlpha", "mintB", dec!(1000), dec!(1000)))
        .await
        .unwrap();
    for _ in 0..3 {
        service.swap(swap_request(&pool, dec!(1))).await.unwrap();
    }

    let created = service
        .transactions_by_wallet(&wallet("creator"), TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(created.total, 2);
    assert_eq!(created.transactions[0].kind, TransactionKind::CreatePool);

    let page = service
        .transactions_by_wallet(
            &wallet("trader"),
            TransactionQuery {
                kind: Some(TransactionKind::Swap),
                limit: 2,
                offset: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.transactions.len(), 1);
    assert!(!page.has_more);

    let recent = service.recent_transactions(4).await.unwrap();
    assert_eq!(recent.len(), 4);
    assert!(recent.iter().all(|r| r.kind != TransactionKind::CreateToken));

    let by_creator = service.pools_by_creator(&wallet("creator")).await.unwrap();
    assert_eq!(by_creator.len(), 1);
    let by_pair = service.pool_by_pair(&mint("mintB"), &mint("mintAlpha")).await.unwrap();
    assert_eq!(by_pair.map(|p| p.address), Some(pool.address));
}
