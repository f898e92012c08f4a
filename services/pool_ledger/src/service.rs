//! Pool service: quote, settle, commit
//!
//! Every mutation follows the same path: read the pool, quote with the AMM
//! engine, settle through the [`SettlementClient`], then commit the settled
//! amounts with a version check. A stale version triggers a re-read and the
//! settled deltas are applied to the fresh reserves, up to
//! `max_commit_retries` times.

use crate::error::{LedgerError, Result};
use crate::ledger::PoolLedger;
use crate::settlement::{
    LiquidityInstruction, LiquiditySettlement, SettlementClient, SwapInstruction, SwapSettlement,
};
use amm::{
    build_series, LiquidityChangeResult, LiquidityMath, PriceImpactLevel, PriceSeries, PricedPool,
    SwapMath, SwapQuote, TimeRange,
};
use chrono::{DateTime, Utc};
use launchpad_config::EngineSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{
    require_positive, AmmError, NewPool, NewToken, Pool, PoolAddress, PriceEventKind,
    PriceHistoryPoint, Reserves, SwapDirection, Token, TokenMint, TokenPairKey,
    TransactionDetails, TransactionKind, TransactionPage, TransactionQuery, TransactionRecord,
    TransactionStatus, TxSignature, WalletAddress,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub pool: PoolAddress,
    pub wallet: WalletAddress,
    pub amount_in: Decimal,
    pub direction: SwapDirection,
    /// Falls back to the configured default when absent
    pub slippage_percent: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub pool: PoolAddress,
    pub wallet: WalletAddress,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub pool: PoolAddress,
    pub wallet: WalletAddress,
    pub lp_amount: Decimal,
    /// Provider's LP token balance as read from chain
    pub caller_lp_balance: Decimal,
}

/// Quote shown to a user before swapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPreview {
    pub token_in: TokenMint,
    pub token_out: TokenMint,
    pub quote: SwapQuote,
    pub min_amount_out: Decimal,
    pub impact_level: PriceImpactLevel,
    /// Impact above the configured warning threshold
    pub high_impact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub pool: Pool,
    pub quote: SwapQuote,
    pub min_amount_out: Decimal,
    pub settlement: SwapSettlement,
    pub price_point: PriceHistoryPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub pool: Pool,
    pub change: LiquidityChangeResult,
    pub settlement: LiquiditySettlement,
    pub price_point: PriceHistoryPoint,
}

/// Pool operations over a ledger and a settlement client
pub struct PoolService<L, S> {
    ledger: Arc<L>,
    settlement: Arc<S>,
    settings: EngineSettings,
    fee_percent: Decimal,
    default_slippage_percent: Decimal,
    high_price_impact_percent: Decimal,
    deposit_ratio_tolerance_percent: Option<Decimal>,
}

impl<L, S> PoolService<L, S>
where
    L: PoolLedger,
    S: SettlementClient,
{
    pub fn new(ledger: Arc<L>, settlement: Arc<S>, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            fee_percent: settings.fee()?,
            default_slippage_percent: settings.default_slippage()?,
            high_price_impact_percent: settings.high_price_impact()?,
            deposit_ratio_tolerance_percent: settings.deposit_ratio_tolerance()?,
            ledger,
            settlement,
            settings,
        })
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Register a launched token so pools can list it
    ///
    /// A `create_token` activity entry is written when the launch carries a
    /// signature.
    pub async fn create_token(&self, new_token: NewToken) -> Result<Token> {
        new_token.validate()?;
        let token = self.ledger.insert_token(new_token.into_token(Utc::now())).await?;

        match &token.tx_signature {
            Some(signature) => {
                self.record(TransactionRecord {
                    signature: signature.clone(),
                    kind: TransactionKind::CreateToken,
                    wallet: token.creator_wallet.clone(),
                    pool_address: None,
                    details: TransactionDetails::TokenLaunch {
                        mint: token.mint.clone(),
                        name: token.name.clone(),
                        symbol: token.symbol.clone(),
                    },
                    status: TransactionStatus::Confirmed,
                    timestamp: token.created_at,
                })
                .await?;
            }
            None => debug!(mint = %token.mint, "No launch signature, activity not recorded"),
        }

        Ok(token)
    }

    pub async fn token(&self, mint: &TokenMint) -> Result<Token> {
        self.ledger.get_token(mint).await
    }

    pub async fn tokens(&self) -> Result<Vec<Token>> {
        self.ledger.list_tokens().await
    }

    pub async fn tokens_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Token>> {
        self.ledger.list_tokens_by_creator(wallet).await
    }

    /// Register a pool seeded with its initial liquidity
    ///
    /// Both mints must already be registered tokens. The creator receives
    /// `sqrt(initial_amount_a * initial_amount_b)` LP shares, the whole
    /// initial supply.
    pub async fn create_pool(&self, new_pool: NewPool) -> Result<Pool> {
        TokenPairKey::new(&new_pool.token_a_mint, &new_pool.token_b_mint)?;
        for mint in [&new_pool.token_a_mint, &new_pool.token_b_mint] {
            if let Err(err) = self.ledger.get_token(mint).await {
                warn!(pool = %new_pool.address, mint = %mint, "Pool references an unregistered token");
                return Err(err);
            }
        }
        if self
            .ledger
            .find_pool_by_pair(&new_pool.token_a_mint, &new_pool.token_b_mint)
            .await?
            .is_some()
        {
            return Err(AmmError::TokenPairAlreadyExists {
                token_a: new_pool.token_a_mint.to_string(),
                token_b: new_pool.token_b_mint.to_string(),
            }
            .into());
        }

        let seed = LiquidityMath::quote_deposit(
            &Reserves::EMPTY,
            new_pool.initial_amount_a,
            new_pool.initial_amount_b,
        )?;

        let now = Utc::now();
        let pool = Pool {
            address: new_pool.address,
            token_a_mint: new_pool.token_a_mint,
            token_b_mint: new_pool.token_b_mint,
            reserves: seed.reserves,
            lp_mint: new_pool.lp_mint,
            vault_a: new_pool.vault_a,
            vault_b: new_pool.vault_b,
            creator_wallet: new_pool.creator_wallet,
            tx_signature: new_pool.tx_signature,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        let init_price = pool.spot_price()?;
        let init_point = PriceHistoryPoint::new(
            pool.address.clone(),
            &pool.reserves,
            init_price,
            PriceEventKind::Init,
            pool.tx_signature.clone(),
            now,
        );

        let pool = self.ledger.insert_pool(pool, init_point).await?;
        info!(
            pool = %pool.address,
            pair = %format!("{}/{}", pool.token_a_mint, pool.token_b_mint),
            lp_supply = %pool.reserves.lp_total_supply,
            price = %init_price,
            "Pool created"
        );

        match &pool.tx_signature {
            Some(signature) => {
                self.record(TransactionRecord {
                    signature: signature.clone(),
                    kind: TransactionKind::CreatePool,
                    wallet: pool.creator_wallet.clone(),
                    pool_address: Some(pool.address.clone()),
                    details: TransactionDetails::PoolLaunch {
                        token_a: pool.token_a_mint.clone(),
                        token_b: pool.token_b_mint.clone(),
                    },
                    status: TransactionStatus::Confirmed,
                    timestamp: now,
                })
                .await?;
            }
            None => debug!(pool = %pool.address, "No creation signature, activity not recorded"),
        }

        Ok(pool)
    }

    /// Quote a swap against current reserves with the configured fee
    ///
    /// A zero `amount_out` means the pool cannot fill the trade.
    pub async fn quote_swap(
        &self,
        address: &PoolAddress,
        amount_in: Decimal,
        direction: SwapDirection,
    ) -> Result<SwapPreview> {
        require_positive("amount_in", amount_in)?;
        let pool = self.ledger.get_pool(address).await?;
        let (reserve_in, reserve_out) = pool.reserves_for(direction);
        let quote = SwapMath::quote_swap(reserve_in, reserve_out, amount_in, self.fee_percent);
        let min_amount_out = SwapMath::min_amount_out(quote.amount_out, self.default_slippage_percent)?;
        debug!(
            pool = %address,
            %amount_in,
            amount_out = %quote.amount_out,
            impact = %quote.price_impact_percent,
            "Swap quoted"
        );
        Ok(self.preview(&pool, direction, quote, min_amount_out))
    }

    fn preview(
        &self,
        pool: &Pool,
        direction: SwapDirection,
        quote: SwapQuote,
        min_amount_out: Decimal,
    ) -> SwapPreview {
        let (token_in, token_out) = pool.mints_for(direction);
        SwapPreview {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            quote,
            min_amount_out,
            impact_level: quote.impact_level(),
            high_impact: quote.price_impact_percent > self.high_price_impact_percent,
        }
    }

    /// Execute a swap
    ///
    /// Fails with `InsufficientLiquidity` on a zero quote and with
    /// `SlippageExceeded` when the settled output falls below the minimum.
    pub async fn swap(&self, request: SwapRequest) -> Result<SwapReceipt> {
        require_positive("amount_in", request.amount_in)?;
        let slippage = request
            .slippage_percent
            .unwrap_or(self.default_slippage_percent);

        let pool = self.ledger.get_pool(&request.pool).await?;
        let (reserve_in, reserve_out) = pool.reserves_for(request.direction);
        let quote = SwapMath::quote_swap(reserve_in, reserve_out, request.amount_in, self.fee_percent);
        if quote.is_insufficient_liquidity() {
            warn!(pool = %request.pool, amount_in = %request.amount_in, "Swap rejected, zero output");
            return Err(AmmError::InsufficientLiquidity.into());
        }
        let min_amount_out = SwapMath::min_amount_out(quote.amount_out, slippage)?;
        if quote.price_impact_percent > self.high_price_impact_percent {
            warn!(
                pool = %request.pool,
                impact = %quote.price_impact_percent,
                "Executing swap with high price impact"
            );
        }

        let settled = self
            .settlement
            .settle_swap(
                &pool,
                &SwapInstruction {
                    wallet: request.wallet.clone(),
                    direction: request.direction,
                    amount_in: request.amount_in,
                    quoted_amount_out: quote.amount_out,
                    min_amount_out,
                },
            )
            .await?;

        if settled.amount_out < min_amount_out {
            warn!(
                pool = %request.pool,
                received = %settled.amount_out,
                minimum = %min_amount_out,
                "Swap rejected, slippage exceeded"
            );
            return Err(LedgerError::SlippageExceeded {
                received: settled.amount_out,
                minimum: min_amount_out,
            });
        }

        let (token_in, token_out) = {
            let (token_in, token_out) = pool.mints_for(request.direction);
            (token_in.clone(), token_out.clone())
        };
        let direction = request.direction;
        let (pool, price_point, ()) = self
            .commit_with_retry(pool, PriceEventKind::Swap, &settled.signature, |reserves| {
                let next = SwapMath::apply_settled(reserves, direction, settled.amount_in, settled.amount_out)?;
                Ok((next, ()))
            })
            .await?;

        self.record(TransactionRecord {
            signature: settled.signature.clone(),
            kind: TransactionKind::Swap,
            wallet: request.wallet,
            pool_address: Some(pool.address.clone()),
            details: TransactionDetails::Swap {
                token_in,
                token_out,
                amount_in: settled.amount_in,
                amount_out: settled.amount_out,
            },
            status: TransactionStatus::Confirmed,
            timestamp: price_point.timestamp,
        })
        .await?;

        Ok(SwapReceipt {
            pool,
            quote,
            min_amount_out,
            settlement: settled,
            price_point,
        })
    }

    /// Preview a deposit; `amount_b` defaults to the pool-ratio match
    pub async fn quote_deposit(
        &self,
        address: &PoolAddress,
        amount_a: Decimal,
        amount_b: Option<Decimal>,
    ) -> Result<LiquidityChangeResult> {
        let pool = self.ledger.get_pool(address).await?;
        let amount_b = match amount_b {
            Some(amount_b) => amount_b,
            None => LiquidityMath::matching_amount_b(&pool.reserves, amount_a)?,
        };
        Ok(LiquidityMath::quote_deposit(&pool.reserves, amount_a, amount_b)?)
    }

    /// Deposit both tokens and mint LP shares
    pub async fn add_liquidity(&self, request: DepositRequest) -> Result<LiquidityReceipt> {
        let pool = self.ledger.get_pool(&request.pool).await?;
        if let Some(tolerance) = self.deposit_ratio_tolerance_percent {
            LiquidityMath::validate_deposit_ratio(
                &pool.reserves,
                request.amount_a,
                request.amount_b,
                tolerance,
            )?;
        }
        let quoted = LiquidityMath::quote_deposit(&pool.reserves, request.amount_a, request.amount_b)?;

        let settled = self
            .settlement
            .settle_deposit(
                &pool,
                &LiquidityInstruction {
                    wallet: request.wallet.clone(),
                    amount_a: quoted.amount_a,
                    amount_b: quoted.amount_b,
                    lp_amount: quoted.lp_minted,
                },
            )
            .await?;

        // LP shares are re-derived from whatever reserves the commit lands on
        let (pool, price_point, change) = self
            .commit_with_retry(pool, PriceEventKind::Deposit, &settled.signature, |reserves| {
                let change = LiquidityMath::quote_deposit(reserves, settled.amount_a, settled.amount_b)?;
                Ok((change.reserves, change))
            })
            .await?;

        self.record_liquidity(TransactionKind::Deposit, &request.wallet, &pool, &settled, change.lp_minted, &price_point)
            .await?;

        Ok(LiquidityReceipt {
            pool,
            change,
            settlement: settled,
            price_point,
        })
    }

    /// Preview a withdrawal under the configured basis
    pub async fn quote_withdraw(
        &self,
        address: &PoolAddress,
        lp_amount: Decimal,
        caller_lp_balance: Decimal,
    ) -> Result<LiquidityChangeResult> {
        Self::check_lp_balance(lp_amount, caller_lp_balance)?;
        let pool = self.ledger.get_pool(address).await?;
        Ok(LiquidityMath::quote_withdraw_with(
            self.settings.withdraw_basis,
            &pool.reserves,
            lp_amount,
            caller_lp_balance,
        )?)
    }

    /// Burn LP shares and pay out both tokens
    pub async fn withdraw_liquidity(&self, request: WithdrawRequest) -> Result<LiquidityReceipt> {
        Self::check_lp_balance(request.lp_amount, request.caller_lp_balance)?;
        let pool = self.ledger.get_pool(&request.pool).await?;
        let quoted = LiquidityMath::quote_withdraw_with(
            self.settings.withdraw_basis,
            &pool.reserves,
            request.lp_amount,
            request.caller_lp_balance,
        )?;

        let settled = self
            .settlement
            .settle_withdraw(
                &pool,
                &LiquidityInstruction {
                    wallet: request.wallet.clone(),
                    amount_a: quoted.amount_a,
                    amount_b: quoted.amount_b,
                    lp_amount: request.lp_amount,
                },
            )
            .await?;

        let (pool, price_point, change) = self
            .commit_with_retry(pool, PriceEventKind::Withdraw, &settled.signature, |reserves| {
                let change = LiquidityMath::apply_settled_withdraw(
                    reserves,
                    settled.amount_a,
                    settled.amount_b,
                    settled.lp_amount,
                )?;
                Ok((change.reserves, change))
            })
            .await?;

        self.record_liquidity(TransactionKind::Withdraw, &request.wallet, &pool, &settled, settled.lp_amount, &price_point)
            .await?;

        Ok(LiquidityReceipt {
            pool,
            change,
            settlement: settled,
            price_point,
        })
    }

    fn check_lp_balance(lp_amount: Decimal, caller_lp_balance: Decimal) -> Result<()> {
        if lp_amount > caller_lp_balance {
            return Err(LedgerError::InsufficientLpBalance {
                requested: lp_amount,
                balance: caller_lp_balance,
            });
        }
        Ok(())
    }

    /// Commit new reserves derived by `apply`, retrying on version conflicts
    ///
    /// `apply` is re-run against freshly read reserves on every attempt.
    async fn commit_with_retry<T, F>(
        &self,
        mut pool: Pool,
        kind: PriceEventKind,
        signature: &TxSignature,
        apply: F,
    ) -> Result<(Pool, PriceHistoryPoint, T)>
    where
        F: Fn(&Reserves) -> std::result::Result<(Reserves, T), AmmError>,
    {
        let address = pool.address.clone();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let (reserves, outcome) = apply(&pool.reserves)?;
            let now = Utc::now();
            let expected_version = pool.version;

            let mut next = pool;
            next.reserves = reserves;
            next.updated_at = now;
            let point = PriceHistoryPoint::new(
                address.clone(),
                &reserves,
                next.spot_price()?,
                kind,
                Some(signature.clone()),
                now,
            );

            match self.ledger.commit(next, expected_version, point).await {
                Ok((stored, point)) => {
                    info!(
                        pool = %address,
                        event = %kind,
                        version = stored.version,
                        reserve_a = %stored.reserves.reserve_a,
                        reserve_b = %stored.reserves.reserve_b,
                        price = %point.price,
                        attempts,
                        "Pool state committed"
                    );
                    return Ok((stored, point, outcome));
                }
                Err(err) if err.is_retryable() => {
                    if attempts > self.settings.max_commit_retries {
                        warn!(pool = %address, attempts, "Commit retries exhausted");
                        return Err(LedgerError::RetriesExhausted {
                            address: address.to_string(),
                            attempts,
                        });
                    }
                    warn!(pool = %address, attempts, error = %err, "Stale reserves, re-reading pool");
                    pool = self.ledger.get_pool(&address).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn record_liquidity(
        &self,
        kind: TransactionKind,
        wallet: &WalletAddress,
        pool: &Pool,
        settled: &LiquiditySettlement,
        lp_amount: Decimal,
        price_point: &PriceHistoryPoint,
    ) -> Result<()> {
        self.record(TransactionRecord {
            signature: settled.signature.clone(),
            kind,
            wallet: wallet.clone(),
            pool_address: Some(pool.address.clone()),
            details: TransactionDetails::Liquidity {
                amount_a: settled.amount_a,
                amount_b: settled.amount_b,
                lp_amount,
            },
            status: TransactionStatus::Confirmed,
            timestamp: price_point.timestamp,
        })
        .await
    }

    async fn record(&self, record: TransactionRecord) -> Result<()> {
        self.ledger.record_transaction(record).await
    }

    /// Chart data for a window ending now
    pub async fn price_series(&self, address: &PoolAddress, range: TimeRange) -> Result<PriceSeries> {
        self.price_series_at(address, range, Utc::now()).await
    }

    /// Chart data for a window ending at `now`
    pub async fn price_series_at(
        &self,
        address: &PoolAddress,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let pool = self.ledger.get_pool(address).await?;
        let start = range.window_start(now);
        let points = self.ledger.list_price_history(address, start).await?;
        Ok(build_series(&points, start, now, pool.spot_price()?))
    }

    pub async fn pool(&self, address: &PoolAddress) -> Result<Pool> {
        self.ledger.get_pool(address).await
    }

    pub async fn pool_by_pair(&self, mint_x: &TokenMint, mint_y: &TokenMint) -> Result<Option<Pool>> {
        self.ledger.find_pool_by_pair(mint_x, mint_y).await
    }

    pub async fn pools(&self) -> Result<Vec<Pool>> {
        self.ledger.list_pools().await
    }

    pub async fn pools_by_creator(&self, wallet: &WalletAddress) -> Result<Vec<Pool>> {
        self.ledger.list_pools_by_creator(wallet).await
    }

    pub async fn transactions_by_wallet(
        &self,
        wallet: &WalletAddress,
        query: TransactionQuery,
    ) -> Result<TransactionPage> {
        self.ledger.transactions_by_wallet(wallet, query).await
    }

    pub async fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        self.ledger.recent_transactions(limit).await
    }
}
