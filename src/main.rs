use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thorchain_client::chain::types::BroadcastMode;
use thorchain_client::config::{Config, MNEMONIC_ENV};
use thorchain_client::{Network, NormalTxParams, ThorClient, TxFilter, VaultTxParams};

// Constants for validation
const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Parser)]
#[command(name = "thorchain-cli")]
#[command(about = "Thorchain wallet client", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured network (mainnet or testnet)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// BIP39 mnemonic of the wallet
    #[arg(long, env = "THOR_MNEMONIC", hide_env_values = true, global = true)]
    mnemonic: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a new 12-word mnemonic
    GeneratePhrase,

    /// Show the wallet address on the selected network
    Address,

    /// Check an address against the selected network's prefix
    ValidateAddress { address: String },

    /// Show the balance of an address (defaults to the wallet)
    Balance { address: Option<String> },

    /// Search transactions
    Txs {
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        sender: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        min_height: Option<u64>,
        #[arg(long)]
        max_height: Option<u64>,
    },

    /// Send coins
    Send {
        to: String,
        /// Integer amount in base units
        amount: String,
        #[arg(long, default_value = "rune")]
        asset: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        mode: Option<BroadcastMode>,
    },

    /// Send coins with a memo (deposits, swaps)
    Vault {
        to: String,
        amount: String,
        memo: String,
        #[arg(long, default_value = "rune")]
        asset: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        mode: Option<BroadcastMode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thorchain_client=info,thorchain_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mnemonic = cli.mnemonic.as_deref();

    match cli.command {
        Commands::Init { output } => {
            let output = output.unwrap_or(config_path);
            Config::default().save(&output)?;
            info!("Configuration file created at: {}", output.display());
        }
        Commands::GeneratePhrase => {
            println!("{}", ThorClient::generate_phrase()?);
        }
        Commands::Address => {
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_client(&config, network, mnemonic)?;
            let Some(address) = client.get_address().await? else {
                bail!("no mnemonic given; set {} or pass --mnemonic", MNEMONIC_ENV);
            };
            println!("{}", address);
            info!("Explorer: {}", client.get_explorer_address_url(&address));
        }
        Commands::ValidateAddress { address } => {
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_client(&config, network, None)?;
            if client.validate_address(&address) {
                println!("valid {} address", network);
            } else {
                bail!("`{}` is not a valid {} address (prefix {})", address, network, client.get_prefix());
            }
        }
        Commands::Balance { address } => {
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_client(&config, network, mnemonic)?;
            match client.get_balance(address.as_deref()).await? {
                Some(coins) if coins.is_empty() => println!("(no coins)"),
                Some(coins) => {
                    for coin in coins {
                        println!("{} {}", coin.amount, coin.denom);
                    }
                }
                None => bail!("balance unavailable from {}", client.get_client_url()),
            }
        }
        Commands::Txs {
            action,
            sender,
            page,
            limit,
            min_height,
            max_height,
        } => {
            if limit.map_or(false, |l| l == 0 || l > MAX_PAGE_LIMIT) {
                bail!("Limit must be between 1 and {}", MAX_PAGE_LIMIT);
            }
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_client(&config, network, None)?;
            let filter = TxFilter {
                message_action: action,
                message_sender: sender,
                page,
                limit,
                tx_min_height: min_height,
                tx_max_height: max_height,
            };
            let Some(txs) = client.get_transactions(Some(filter)).await? else {
                bail!("transaction search unavailable from {}", client.get_client_url());
            };
            println!("{}", serde_json::to_string_pretty(&txs)?);
        }
        Commands::Send {
            to,
            amount,
            asset,
            from,
            mode,
        } => {
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_send_client(&config, network, mnemonic, mode)?;
            let result = client
                .normal_tx(NormalTxParams {
                    address_from: from,
                    address_to: to,
                    amount,
                    asset,
                })
                .await?;
            report_broadcast(&client, &result)?;
        }
        Commands::Vault {
            to,
            amount,
            memo,
            asset,
            from,
            mode,
        } => {
            let (config, network) = settings(&config_path, cli.network)?;
            let client = build_send_client(&config, network, mnemonic, mode)?;
            let result = client
                .vault_tx(VaultTxParams {
                    address_from: from,
                    address_to: to,
                    amount,
                    asset,
                    memo,
                })
                .await?;
            report_broadcast(&client, &result)?;
        }
    }

    Ok(())
}

fn settings(config_path: &Path, network: Option<Network>) -> Result<(Config, Network)> {
    let config = Config::load_or_default(config_path)?;
    let network = network.unwrap_or(config.client.network);
    Ok((config, network))
}

fn build_client(config: &Config, network: Network, mnemonic: Option<&str>) -> Result<ThorClient> {
    ThorClient::with_config(config.client_config(), network, mnemonic).context("creating client")
}

fn build_send_client(
    config: &Config,
    network: Network,
    mnemonic: Option<&str>,
    mode: Option<BroadcastMode>,
) -> Result<ThorClient> {
    if mnemonic.is_none() {
        bail!("sending requires a mnemonic; set {} or pass --mnemonic", MNEMONIC_ENV);
    }
    let mut client_config = config.client_config();
    if let Some(mode) = mode {
        client_config.broadcast_mode = mode;
    }
    ThorClient::with_config(client_config, network, mnemonic).context("creating client")
}

fn report_broadcast(client: &ThorClient, result: &thorchain_client::BroadcastResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    if !result.is_ok() {
        bail!("chain rejected transaction (code {}): {}", result.code, result.raw_log);
    }
    info!("Explorer: {}", client.get_explorer_tx_url(&result.tx_hash));
    Ok(())
}
