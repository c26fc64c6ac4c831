//! Command Line Interface for the Concordium DEX client.
use anyhow::{Context, Result};
use ccd_dex_domain::address::{
    AccountAddress, ContractAddress, parse_account_address, parse_contract_address,
};
use ccd_dex_domain::contract::Energy;
use ccd_dex_domain::enums::SwapDirection;
use ccd_dex_domain::token::{TokenAmount, TokenId, TokenPair, TokenRef};
use ccd_dex_execution::prelude::*;
use ccd_dex_protocols::rpc::{DEFAULT_ENDPOINT, GrpcConfig, GrpcNodeClient};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccd-dex")]
#[command(about = "Query and trade against the Concordium DEX contract", long_about = None)]
struct Cli {
    /// gRPC endpoint of the node
    #[arg(long, env = "CCD_DEX_GRPC_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, env = "CCD_DEX_GRPC_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// DEX contract index
    #[arg(long, env = "CCD_DEX_CONTRACT_INDEX", default_value_t = DEFAULT_CONTRACT_INDEX)]
    contract_index: u64,

    /// DEX contract subindex
    #[arg(long, env = "CCD_DEX_CONTRACT_SUBINDEX", default_value_t = 0)]
    contract_subindex: u64,

    /// DEX contract name
    #[arg(long, env = "CCD_DEX_CONTRACT_NAME", default_value = "dex_contract")]
    contract_name: String,

    /// Module reference holding the contract schema
    #[arg(long, env = "CCD_DEX_MODULE_REF", default_value = DEFAULT_MODULE_REF)]
    module_ref: String,

    /// Energy budget per call
    #[arg(long, env = "CCD_DEX_ENERGY", default_value_t = Energy::DEFAULT_MAX.0)]
    energy: u64,

    /// Connected account (base58); defaults to the wallet file's account
    #[arg(long, env = "CCD_DEX_ACCOUNT", value_parser = parse_account_address)]
    account: Option<AccountAddress>,

    /// Wallet export whose keys sign transactions
    #[arg(long, env = "CCD_DEX_WALLET_FILE")]
    wallet_file: Option<PathBuf>,

    /// Decimals used to display token amounts
    #[arg(long, default_value_t = 6)]
    decimals: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct PairArgs {
    /// CIS-2 contract of token 0 (e.g. <1234,0>)
    #[arg(long, value_parser = parse_contract_address)]
    token0: ContractAddress,

    /// Token 0 id in hex
    #[arg(long, default_value = "00")]
    token0_id: TokenId,

    /// CIS-2 contract of token 1
    #[arg(long, value_parser = parse_contract_address)]
    token1: ContractAddress,

    /// Token 1 id in hex
    #[arg(long, default_value = "00")]
    token1_id: TokenId,
}

impl PairArgs {
    fn pair(&self) -> TokenPair {
        TokenPair::new(
            TokenRef::new(self.token0, self.token0_id.clone()),
            TokenRef::new(self.token1, self.token1_id.clone()),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show pool reserves for a token pair
    Pool {
        #[command(flatten)]
        pair: PairArgs,
    },
    /// Show an account's liquidity shares for a token pair
    Shares {
        #[command(flatten)]
        pair: PairArgs,

        /// Account to query; defaults to the connected account
        #[arg(long, value_parser = parse_account_address)]
        holder: Option<AccountAddress>,
    },
    /// Deposit both tokens into a pool
    AddLiquidity {
        #[command(flatten)]
        pair: PairArgs,

        #[arg(long)]
        amount0: Option<TokenAmount>,

        #[arg(long)]
        amount1: Option<TokenAmount>,

        /// Minimum shares to receive
        #[arg(long, default_value = "0")]
        min_liquidity: TokenAmount,
    },
    /// Burn pool shares for the underlying tokens
    RemoveLiquidity {
        #[command(flatten)]
        pair: PairArgs,

        #[arg(long)]
        shares: Option<TokenAmount>,

        #[arg(long, default_value = "0")]
        min_amount0: TokenAmount,

        #[arg(long, default_value = "0")]
        min_amount1: TokenAmount,
    },
    /// Swap one token of a pair for the other
    Swap {
        #[command(flatten)]
        pair: PairArgs,

        #[arg(long)]
        amount_in: Option<TokenAmount>,

        #[arg(long, default_value = "0")]
        min_amount_out: TokenAmount,

        /// Direction: 0to1 or 1to0
        #[arg(long, default_value = "0to1")]
        direction: SwapDirection,
    },
}

fn display(amount: TokenAmount, decimals: u32) -> String {
    amount
        .to_decimal(decimals)
        .map(|d: Decimal| d.normalize().to_string())
        .unwrap_or_else(|_| amount.to_string())
}

fn drain(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = rx.try_recv() {
        let marker = match notification.outcome {
            Outcome::Success => "✅",
            Outcome::Warning => "⚠️",
            Outcome::Failure => "❌",
        };
        println!("{marker} {}", notification.message);
    }
}

async fn print_state(coordinator: &RequestCoordinator, pair: &TokenPair, decimals: u32) {
    if let Some(pool) = coordinator.pool(pair).await {
        println!("Pool {pair}");
        println!("  {:<16} {}", "token0 reserve", display(pool.token0_reserve, decimals));
        println!("  {:<16} {}", "token1 reserve", display(pool.token1_reserve, decimals));
        println!("  {:<16} {}", "total shares", display(pool.total_shares, decimals));
    }
    if let Some(account) = coordinator.wallet().account().await {
        if let Some(shares) = coordinator.shares(pair, account).await {
            println!("  {:<16} {}", "your shares", display(shares, decimals));
        }
    }
}

fn print_report(report: &MutationReport) {
    println!("Transaction: {}", report.tx_hash);
    if let Some(stale) = report.stale_state() {
        println!("Refreshing {stale} failed; values below may be stale.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let grpc_config = GrpcConfig {
        endpoint: cli.endpoint.clone(),
        timeout_secs: cli.timeout,
    };
    let mut client = GrpcNodeClient::connect(&grpc_config)
        .await
        .context("failed to connect to node")?;
    if let Some(path) = &cli.wallet_file {
        client = client
            .with_wallet_file(path)
            .with_context(|| format!("failed to load wallet file {}", path.display()))?;
    }
    let account = cli.account.or_else(|| client.signer_address());
    let node = Arc::new(client);

    let config = CoordinatorConfig {
        contract_index: cli.contract_index,
        contract_subindex: cli.contract_subindex,
        contract_name: cli.contract_name.clone(),
        module_ref: cli.module_ref.clone(),
        energy: Energy(cli.energy),
        ..Default::default()
    };

    let (channel, mut rx) = ChannelNotifier::new();
    let notifier = MultiNotifier::new()
        .with(Arc::new(TracingNotifier))
        .with(Arc::new(channel));
    let wallet = Arc::new(WalletSession::new(node, account));
    let coordinator = RequestCoordinator::new(&config, wallet, Arc::new(notifier))
        .context("invalid contract configuration")?;

    let contract = coordinator.contract();
    println!("Contract {} ({})", contract.address(), contract.name());

    let (pair, result) = match &cli.command {
        Commands::Pool { pair } => {
            let pair = pair.pair();
            let result = coordinator.query_pool(&pair).await.map(|pool| {
                if pool.is_none() {
                    println!("No pool exists for {pair}");
                }
            });
            (pair, result)
        }
        Commands::Shares { pair, holder } => {
            let pair = pair.pair();
            let holder = match holder {
                Some(holder) => *holder,
                None => coordinator
                    .wallet()
                    .account()
                    .await
                    .context("--holder or --account is required")?,
            };
            let result = coordinator.query_shares(&pair, holder).await.map(|shares| {
                println!("Shares of {holder}: {}", display(shares, cli.decimals));
            });
            (pair, result)
        }
        Commands::AddLiquidity {
            pair,
            amount0,
            amount1,
            min_liquidity,
        } => {
            let pair = pair.pair();
            let result = coordinator
                .add_liquidity(&pair, *amount0, *amount1, *min_liquidity)
                .await
                .map(|report| print_report(&report));
            (pair, result)
        }
        Commands::RemoveLiquidity {
            pair,
            shares,
            min_amount0,
            min_amount1,
        } => {
            let pair = pair.pair();
            let result = coordinator
                .remove_liquidity(&pair, *shares, *min_amount0, *min_amount1)
                .await
                .map(|report| print_report(&report));
            (pair, result)
        }
        Commands::Swap {
            pair,
            amount_in,
            min_amount_out,
            direction,
        } => {
            let pair = pair.pair();
            let result = coordinator
                .swap(&pair, *amount_in, *min_amount_out, *direction)
                .await
                .map(|report| print_report(&report));
            (pair, result)
        }
    };

    drain(&mut rx);
    result.context("operation failed")?;
    print_state(&coordinator, &pair, cli.decimals).await;
    Ok(())
}
