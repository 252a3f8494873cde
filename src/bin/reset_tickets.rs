use anyhow::Result;
use clap::Parser;
use log::info;

use catalyst_automations::{CatalystClient, CatalystConfig, emit, scripts};

#[derive(Parser)]
#[command(name = "reset-tickets")]
#[command(about = "Delete all tickets and create a fresh \"New Ticket\" alert")]
struct Args {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let config = CatalystConfig::from_env()?;
    info!("📡 Catalyst: {}", config.app_url);
    let client = CatalystClient::from_env_config(&config)?;

    let created = scripts::reset_tickets(&client).await?;
    emit(&created)?;
    Ok(())
}
