//! Pool ledger command line entry point

use amm::{LiquidityMath, Reserves, SwapMath, TimeRange};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launchpad_config::{load_config, LaunchpadConfig, LoggingSettings};
use pool_ledger::{
    DepositRequest, InMemoryLedger, PoolService, SimulatedSettlement, SwapRequest, WithdrawRequest,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::{
    AccountAddress, NewPool, NewToken, PoolAddress, SwapDirection, TokenLinks, TokenMint,
    TxSignature, WalletAddress,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay name (reads environments/<name>.toml)
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a swap against explicit reserves
    QuoteSwap {
        #[arg(long)]
        reserve_in: Decimal,
        #[arg(long)]
        reserve_out: Decimal,
        #[arg(long)]
        amount_in: Decimal,
        /// Overrides the configured fee
        #[arg(long)]
        fee_percent: Option<Decimal>,
        /// Overrides the configured default slippage
        #[arg(long)]
        slippage_percent: Option<Decimal>,
    },

    /// Quote a deposit; amount_b defaults to the pool-ratio match
    QuoteDeposit {
        #[arg(long)]
        reserve_a: Decimal,
        #[arg(long)]
        reserve_b: Decimal,
        #[arg(long)]
        lp_total_supply: Decimal,
        #[arg(long)]
        amount_a: Decimal,
        #[arg(long)]
        amount_b: Option<Decimal>,
    },

    /// Quote a withdrawal under the configured basis
    QuoteWithdraw {
        #[arg(long)]
        reserve_a: Decimal,
        #[arg(long)]
        reserve_b: Decimal,
        #[arg(long)]
        lp_total_supply: Decimal,
        #[arg(long)]
        lp_amount: Decimal,
        /// Defaults to the whole LP supply
        #[arg(long)]
        caller_lp_balance: Option<Decimal>,
    },

    /// Launch two tokens, create their pool, swap, deposit and withdraw in
    /// memory, then print the chart
    Demo {
        #[arg(long, default_value = "100")]
        initial_a: Decimal,
        #[arg(long, default_value = "400")]
        initial_b: Decimal,
        #[arg(long, default_value = "10")]
        swap_amount: Decimal,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.environment.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!("Starting pool ledger");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::QuoteSwap {
            reserve_in,
            reserve_out,
            amount_in,
            fee_percent,
            slippage_percent,
        } => {
            let fee = match fee_percent {
                Some(fee) => fee,
                None => config.engine.fee()?,
            };
            let slippage = match slippage_percent {
                Some(slippage) => slippage,
                None => config.engine.default_slippage()?,
            };
            let quote = SwapMath::quote_swap(reserve_in, reserve_out, amount_in, fee);
            let min_amount_out = SwapMath::min_amount_out(quote.amount_out, slippage)?;
            print_json(&json!({
                "quote": quote,
                "min_amount_out": min_amount_out,
                "impact_level": quote.impact_level(),
                "insufficient_liquidity": quote.is_insufficient_liquidity(),
            }))?;
        }
        Command::QuoteDeposit {
            reserve_a,
            reserve_b,
            lp_total_supply,
            amount_a,
            amount_b,
        } => {
            let reserves = Reserves::new(reserve_a, reserve_b, lp_total_supply);
            let amount_b = match amount_b {
                Some(amount_b) => amount_b,
                None => LiquidityMath::matching_amount_b(&reserves, amount_a)?,
            };
            print_json(&LiquidityMath::quote_deposit(&reserves, amount_a, amount_b)?)?;
        }
        Command::QuoteWithdraw {
            reserve_a,
            reserve_b,
            lp_total_supply,
            lp_amount,
            caller_lp_balance,
        } => {
            let reserves = Reserves::new(reserve_a, reserve_b, lp_total_supply);
            let change = LiquidityMath::quote_withdraw_with(
                config.engine.withdraw_basis,
                &reserves,
                lp_amount,
                caller_lp_balance.unwrap_or(lp_total_supply),
            )?;
            print_json(&change)?;
        }
        Command::Demo {
            initial_a,
            initial_b,
            swap_amount,
        } => run_demo(&config, initial_a, initial_b, swap_amount).await?,
        Command::ShowConfig => println!("{}", config.to_toml()?),
    }

    Ok(())
}

fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Invalid log filter")?;
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr, stdout carries the JSON results
    let initialised = if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    initialised.context("Failed to initialise tracing")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_demo(
    config: &LaunchpadConfig,
    initial_a: Decimal,
    initial_b: Decimal,
    swap_amount: Decimal,
) -> Result<()> {
    let ledger = Arc::new(InMemoryLedger::new());
    let service = PoolService::new(
        Arc::clone(&ledger),
        Arc::new(SimulatedSettlement::new()),
        config.engine.clone(),
    )?;

    let creator = WalletAddress::new("DemoCreatorWallet1111111111111111")?;
    let trader = WalletAddress::new("DemoTraderWallet11111111111111111")?;
    let address = PoolAddress::new("DemoPoolAddress11111111111111111")?;

    let token_a = TokenMint::new("DemoTokenMintA111111111111111111")?;
    let token_b = TokenMint::new("So11111111111111111111111111111111111111112")?;
    for (mint, name, symbol, signature) in [
        (&token_a, "Demo Token", "DEMO", Some(TxSignature::new("demo-create-token")?)),
        (&token_b, "Wrapped SOL", "SOL", None),
    ] {
        service
            .create_token(NewToken {
                mint: mint.clone(),
                creator_wallet: creator.clone(),
                name: name.to_string(),
                symbol: symbol.to_string(),
                image_url: format!("https://example.org/{}.png", symbol.to_lowercase()),
                description: None,
                supply: 1_000_000_000,
                decimals: 9,
                links: TokenLinks::default(),
                tx_signature: signature,
            })
            .await?;
    }

    let pool = service
        .create_pool(NewPool {
            address: address.clone(),
            token_a_mint: token_a,
            token_b_mint: token_b,
            lp_mint: AccountAddress::new("DemoLpMint1111111111111111111111")?,
            vault_a: AccountAddress::new("DemoVaultA111111111111111111111")?,
            vault_b: AccountAddress::new("DemoVaultB111111111111111111111")?,
            initial_amount_a: initial_a,
            initial_amount_b: initial_b,
            creator_wallet: creator.clone(),
            tx_signature: Some(TxSignature::new("demo-create-pool")?),
        })
        .await?;
    let mut creator_lp = pool.reserves.lp_total_supply;

    let preview = service
        .quote_swap(&address, swap_amount, SwapDirection::AToB)
        .await?;
    info!(amount_out = %preview.quote.amount_out, "Demo swap quoted");
    service
        .swap(SwapRequest {
            pool: address.clone(),
            wallet: trader,
            amount_in: swap_amount,
            direction: SwapDirection::AToB,
            slippage_percent: None,
        })
        .await?;

    let deposit_a = initial_a / Decimal::TWO;
    let deposit = service.quote_deposit(&address, deposit_a, None).await?;
    let receipt = service
        .add_liquidity(DepositRequest {
            pool: address.clone(),
            wallet: creator.clone(),
            amount_a: deposit.amount_a,
            amount_b: deposit.amount_b,
        })
        .await?;
    creator_lp += receipt.change.lp_minted;

    service
        .withdraw_liquidity(WithdrawRequest {
            pool: address.clone(),
            wallet: creator,
            lp_amount: creator_lp / Decimal::TWO,
            caller_lp_balance: creator_lp,
        })
        .await?;

    let pool = service.pool(&address).await?;
    let series = service.price_series(&address, TimeRange::All).await?;
    print_json(&json!({
        "tokens": service.tokens().await?,
        "pool": pool,
        "series": series,
        "ledger": ledger.stats(),
    }))
}
