//! Command line entrypoint for the rebalancer keeper.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rebalancer_keeper::prelude::*;
use rebalancer_ledger::{LedgerClient, RpcLedgerClient, VaultReader};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, read_keypair_file};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "rebalancer-keeper")]
#[command(about = "Keeper bot driving a liquidity-rebalancing vault", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the keeper loop against a vault
    Run {
        /// Node RPC endpoint (falls back to the PROVIDER env var)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Path to the keeper signing keypair (env: KEEPER_KEYPAIR)
        #[arg(long)]
        keypair: Option<PathBuf>,

        /// Vault program id (env: REBALANCER_PROGRAM_ID)
        #[arg(long)]
        program_id: Option<String>,

        /// Target vault address (env: VAULT_ADDRESS); required in production
        #[arg(long)]
        vault: Option<String>,

        /// Operating mode: production or sandbox
        #[arg(long, default_value = "production")]
        mode: String,

        /// Token 0 mint, for locating the vault by pair in sandbox mode
        #[arg(long)]
        mint_0: Option<String>,

        /// Token 1 mint, for locating the vault by pair in sandbox mode
        #[arg(long)]
        mint_1: Option<String>,

        /// Pool fee tier for the sandbox locator
        #[arg(long, default_value_t = 3000)]
        fee: u32,

        /// Height poll interval in milliseconds
        #[arg(long, default_value_t = 400)]
        poll_interval_ms: u64,

        /// Bounded wait for transaction confirmation, in seconds
        #[arg(long, default_value_t = 60)]
        confirm_timeout_secs: u64,

        /// Ticks from current price down to the new range's lower bound
        #[arg(long, default_value_t = 600)]
        lower_offset: i32,

        /// Ticks from current price up to the new range's upper bound
        #[arg(long, default_value_t = 600)]
        upper_offset: i32,

        /// Pool tick spacing used to align planned range bounds
        #[arg(long, default_value_t = 60)]
        tick_spacing: i32,
    },

    /// Print a vault's current state without signing anything
    Status {
        /// Node RPC endpoint (falls back to the PROVIDER env var)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Vault program id (env: REBALANCER_PROGRAM_ID)
        #[arg(long)]
        program_id: Option<String>,

        /// Vault address to inspect (env: VAULT_ADDRESS)
        #[arg(long)]
        vault: Option<String>,

        /// Also report this owner's participant account
        #[arg(long)]
        participant: Option<String>,
    },
}

fn flag_or_env(flag: Option<String>, var: &str) -> Option<String> {
    flag.or_else(|| env::var(var).ok())
}

fn parse_pubkey(value: &str, what: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("invalid {what}: {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            rpc_url,
            keypair,
            program_id,
            vault,
            mode,
            mint_0,
            mint_1,
            fee,
            poll_interval_ms,
            confirm_timeout_secs,
            lower_offset,
            upper_offset,
            tick_spacing,
        } => {
            let endpoint = flag_or_env(rpc_url, "PROVIDER").unwrap_or_default();
            let keypair_path = keypair.or_else(|| env::var("KEEPER_KEYPAIR").ok().map(PathBuf::from));
            let program_id = flag_or_env(program_id, "REBALANCER_PROGRAM_ID")
                .ok_or_else(|| anyhow!("vault program id is not configured"))?;
            let program_id = parse_pubkey(&program_id, "program id")?;

            let vault = flag_or_env(vault, "VAULT_ADDRESS")
                .map(|v| parse_pubkey(&v, "vault address"))
                .transpose()?;

            let locator = match (mint_0, mint_1) {
                (Some(mint_0), Some(mint_1)) => Some(VaultLocator {
                    token_mint_0: parse_pubkey(&mint_0, "token 0 mint")?,
                    token_mint_1: parse_pubkey(&mint_1, "token 1 mint")?,
                    fee_rate: fee,
                }),
                _ => None,
            };

            let config = KeeperConfig {
                endpoint,
                keypair_path,
                program_id,
                mode: Mode::from_str(&mode)?,
                vault,
                locator,
                poll_interval: Duration::from_millis(poll_interval_ms),
                confirm_timeout: Duration::from_secs(confirm_timeout_secs),
                retry: RetryPolicy::default(),
                planner: PlannerConfig {
                    lower_offset_ticks: lower_offset,
                    upper_offset_ticks: upper_offset,
                    tick_spacing,
                },
            };
            config.validate()?;

            let keypair_path = config
                .keypair_path
                .clone()
                .ok_or_else(|| anyhow!("keeper keypair path is not configured"))?;
            let payer = read_keypair_file(&keypair_path)
                .map_err(|e| anyhow!("failed to read keypair {}: {e}", keypair_path.display()))?;

            let client: Arc<dyn LedgerClient> = Arc::new(RpcLedgerClient::new(
                config.endpoint.clone(),
                payer,
                config.confirm_timeout,
            ));

            let keeper = Arc::new(KeeperLoop::new(client.clone(), &config)?);

            let watcher_config = WatcherConfig {
                poll_interval: config.poll_interval,
                ..WatcherConfig::default()
            };
            let heights = BlockWatcher::new(client, watcher_config).spawn();

            // Cooperative shutdown: the flag is checked between cycles, so
            // an in-flight summarization drive always completes first.
            let shutdown = keeper.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown requested, stopping after current cycle");
                    shutdown.stop();
                }
            });

            info!(
                endpoint = %config.endpoint,
                mode = ?config.mode,
                "Keeper starting"
            );

            // Only configuration errors exit non-zero; a halted loop is
            // logged and the process ends cleanly.
            if let Err(err) = keeper.run(heights).await {
                error!(error = %err, "Keeper loop halted");
            }
        }

        Commands::Status {
            rpc_url,
            program_id,
            vault,
            participant,
        } => {
            let endpoint = flag_or_env(rpc_url, "PROVIDER")
                .ok_or_else(|| anyhow!("node endpoint is not configured"))?;
            let program_id = flag_or_env(program_id, "REBALANCER_PROGRAM_ID")
                .ok_or_else(|| anyhow!("vault program id is not configured"))?;
            let program_id = parse_pubkey(&program_id, "program id")?;
            let vault = flag_or_env(vault, "VAULT_ADDRESS")
                .ok_or_else(|| anyhow!("vault address is not configured"))?;
            let vault = parse_pubkey(&vault, "vault address")?;

            // Reads only, so an ephemeral keypair stands in for the payer.
            let client: Arc<dyn LedgerClient> = Arc::new(RpcLedgerClient::new(
                endpoint,
                Keypair::new(),
                Duration::from_secs(30),
            ));
            let reader = VaultReader::new(client.clone(), program_id, vault);

            let height = client.current_height().await?;
            let state = reader.summarization_state().await?;
            let frequency = reader.summarization_frequency().await?;
            let position = reader.open_position().await?;
            let totals = reader.stake_totals().await?;

            println!("vault:            {vault}");
            println!("height:           {height}");
            println!("range:            [{}, {}]", position.tick_lower, position.tick_upper);
            println!("staked:           {} / {}", totals.amount_0, totals.amount_1);
            println!("stage:            {}", state.stage);
            println!("last summarized:  {}", state.last_summarized_height);
            println!("frequency:        {frequency}");
            println!(
                "summarization:    {}",
                if !state.is_idle() {
                    "in progress"
                } else if state.is_due(height, frequency) {
                    "due"
                } else {
                    "up to date"
                }
            );

            if let Some(owner) = participant {
                let owner = parse_pubkey(&owner, "participant owner")?;
                let p = reader.participant(&owner).await?;
                println!("participant:      {owner}");
                println!("  share:          {}", p.share);
                println!("  deposited:      {} / {}", p.deposited_amount_0, p.deposited_amount_1);
                println!("  fees accrued:   {} / {}", p.fee_amount_0, p.fee_amount_1);
            }
        }
    }

    Ok(())
}
