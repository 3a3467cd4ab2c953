use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merlion_sdk::chain::messages::{MsgDelegate, MsgSend};
use merlion_sdk::chain::queries::{query_all_balances, query_balance};
use merlion_sdk::chain::{
    BroadcastMode, BroadcastResult, Coin, LocalWallet, MerlionClient, Msg, OfflineSigner, Tx,
    WalletFlavor,
};
use merlion_sdk::config::Config;

#[derive(Parser)]
#[command(name = "merlion")]
#[command(about = "Merlion chain client", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WriteArgs {
    /// BIP39 mnemonic of the signing account
    #[arg(long, env = "MERLION_MNEMONIC", hide_env_values = true)]
    mnemonic: String,

    /// Dry-run the transaction and print the gas estimate
    #[arg(long)]
    simulate: bool,

    /// Return right after submission instead of waiting for the commit
    #[arg(long)]
    no_wait: bool,

    /// Broadcast mode: sync or async
    #[arg(long)]
    mode: Option<BroadcastMode>,

    /// Override the configured gas limit
    #[arg(long)]
    gas_limit: Option<u64>,

    #[arg(long)]
    memo: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Send coins to another account
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in the smallest unit
        #[arg(long)]
        amount: u128,

        /// Denomination, defaults to the configured fee denom
        #[arg(long)]
        denom: Option<String>,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Delegate coins to a validator
    Delegate {
        /// Validator operator address
        #[arg(long)]
        validator: String,

        /// Amount in the smallest unit
        #[arg(long)]
        amount: u128,

        #[arg(long)]
        denom: Option<String>,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Look up a transaction by hash
    Tx {
        hash: String,
    },

    /// Show account balances
    Balance {
        /// Account address, defaults to the configured address
        #[arg(long)]
        address: Option<String>,

        /// Only this denomination
        #[arg(long)]
        denom: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merlion_sdk=info,merlion=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            info!("Configuration file created at: {}", output);
        }
        Commands::Send { to, amount, denom, write } => {
            let config = load_config(&cli.config)?;
            let (client, wallet_address) = signing_client(&config, &write.mnemonic).await?;
            let denom = denom.unwrap_or_else(|| config.tx.fee_denom.clone());
            let msg = MsgSend {
                from_address: wallet_address,
                to_address: to,
                amount: vec![Coin::new(amount, denom)],
            };
            run_write(&client, &config, &write, msg).await?;
        }
        Commands::Delegate { validator, amount, denom, write } => {
            let config = load_config(&cli.config)?;
            let (client, wallet_address) = signing_client(&config, &write.mnemonic).await?;
            let denom = denom.unwrap_or_else(|| config.tx.fee_denom.clone());
            let msg = MsgDelegate {
                delegator_address: wallet_address,
                validator_address: validator,
                amount: Coin::new(amount, denom),
            };
            run_write(&client, &config, &write, msg).await?;
        }
        Commands::Tx { hash } => {
            let config = load_config(&cli.config)?;
            let client = MerlionClient::connect(
                config.chain.client_config(),
                &config.chain.chain_id,
                String::new(),
                OfflineSigner::Readonly,
            )
            .await?;
            match client.get_tx(&hash.to_uppercase()).await? {
                Some(tx) => print_tx(&tx),
                None => bail!("Transaction {} not found", hash),
            }
        }
        Commands::Balance { address, denom } => {
            let config = load_config(&cli.config)?;
            let address = address.unwrap_or_else(|| config.chain.address.clone());
            if address.is_empty() {
                bail!("No address given and none configured");
            }
            let client = MerlionClient::connect(
                config.chain.client_config(),
                &config.chain.chain_id,
                address.clone(),
                OfflineSigner::Readonly,
            )
            .await?;
            let querier = client.query().context("client has no query connection")?;

            let balances: Vec<_> = match denom {
                Some(denom) => query_balance(querier, &address, &denom).await?.into_iter().collect(),
                None => query_all_balances(querier, &address).await?,
            };
            info!("=== BALANCES {} ===", address);
            if balances.is_empty() {
                info!("(none)");
            }
            for coin in balances {
                info!("{} {}", coin.amount, coin.denom);
            }
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    Config::load(path).with_context(|| format!("failed to load {} (run `merlion init` first)", path))
}

async fn signing_client(config: &Config, mnemonic: &str) -> Result<(MerlionClient, String)> {
    let flavor = if config.chain.ethermint_keys {
        WalletFlavor::Ethermint
    } else {
        WalletFlavor::Cosmos
    };
    let wallet = LocalWallet::from_mnemonic(mnemonic, "", &config.chain.address_prefix, flavor)?;
    let address = wallet.address.clone();

    if !config.chain.address.is_empty() && config.chain.address != address {
        warn!(
            "Configured address {} does not match mnemonic address {}, using the latter",
            config.chain.address, address
        );
    }

    let client = MerlionClient::connect(
        config.chain.client_config(),
        &config.chain.chain_id,
        address.clone(),
        OfflineSigner::direct(wallet),
    )
    .await?;
    Ok((client, address))
}

async fn run_write<M: Msg>(client: &MerlionClient, config: &Config, write: &WriteArgs, msg: M) -> Result<()> {
    let mut options = config.tx.to_options();
    if let Some(gas_limit) = write.gas_limit {
        options.gas_limit = gas_limit;
    }
    if let Some(memo) = &write.memo {
        options.memo = memo.clone();
    }
    if let Some(mode) = write.mode {
        options.broadcast_mode = mode;
    }
    if write.no_wait {
        options.wait_for_commit = false;
    }

    if write.simulate {
        let response = client.simulate(&[msg], &options).await?;
        match response.gas_info {
            Some(gas) => info!("Simulation: gas used {} (wanted {})", gas.gas_used, gas.gas_wanted),
            None => warn!("Simulation returned no gas info"),
        }
        return Ok(());
    }

    match client.broadcast(&[msg], &options).await? {
        BroadcastResult::Pending { tx_hash } => {
            info!("Submitted {}, not waiting for the commit", tx_hash);
        }
        BroadcastResult::Committed(tx) => {
            print_tx(&tx);
            if !tx.is_success() {
                bail!("Transaction failed with code {} ({:?})", tx.code, tx.result_code());
            }
        }
    }
    Ok(())
}

fn print_tx(tx: &Tx) {
    info!("=== TRANSACTION {} ===", tx.transaction_hash);
    info!("Height: {}", tx.height);
    info!("Code: {} ({:?})", tx.code, tx.result_code());
    info!("Gas: {} used / {} wanted", tx.gas_used, tx.gas_wanted);
    if !tx.timestamp.is_empty() {
        info!("Timestamp: {}", tx.timestamp);
    }
    if !tx.tx.memo.is_empty() {
        info!("Memo: {}", tx.tx.memo);
    }
    for (i, msg) in tx.tx.messages.iter().enumerate() {
        info!("Message {}: {:?}", i, msg);
    }
    match &tx.array_log {
        Some(entries) => {
            for entry in entries {
                info!("  [{}] {}.{} = {}", entry.msg, entry.event_type, entry.key, entry.value);
            }
        }
        None if !tx.is_success() => info!("Log: {}", tx.raw_log),
        None => {}
    }
}
