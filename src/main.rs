//! ChainSherlock CLI - investigate one wallet and print the court case
//!
//! Usage:
//!   chain_sherlock <address> [--pretty] [--alert] [--chain-id <id>]
//!
//! Environment (also read from `.env`):
//!   ETHERSCAN_API_KEY   - required
//!   SHERLOCK_CHAIN_ID   - default 1
//!   TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID - used with --alert
//!   RUST_LOG            - log level (default: info), logs go to stderr

use chain_sherlock::{Investigator, InvestigatorConfig};

use clap::Parser;
use eyre::Result;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about = "Wallet fraud investigation", long_about = None)]
struct Cli {
    /// Wallet address to investigate (0x + 40 hex digits)
    address: String,

    /// Pretty-print the JSON court case
    #[arg(long)]
    pretty: bool,

    /// Send the verdict alert to Telegram
    #[arg(long)]
    alert: bool,

    /// Override SHERLOCK_CHAIN_ID
    #[arg(long)]
    chain_id: Option<u64>,

    /// Override SHERLOCK_FETCH_TIMEOUT_SECS
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut config = InvestigatorConfig::from_env()?;
    if let Some(chain_id) = cli.chain_id {
        config = config.with_chain_id(chain_id)?;
    }
    if let Some(secs) = cli.timeout_secs {
        config.fetch_timeout = Duration::from_secs(secs);
    }
    if cli.alert && config.telegram.is_none() {
        warn!("⚠️ --alert given but TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID are not set");
    }

    let mut investigator = Investigator::from_config(&config)?;
    if !cli.alert {
        investigator = investigator.without_notifier();
    }

    info!("🔎 ChainSherlock on {}", investigator.chain_name());
    let case = investigator.investigate(&cli.address).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&case)?
    } else {
        serde_json::to_string(&case)?
    };
    println!("{}", rendered);

    debug!("{}", investigator.telemetry().get_stats().summary());

    Ok(())
}
