use anyhow::{Context, Result};
use clap::Parser;

use catalyst_automations::scripts::{self, RecordEvent};
use catalyst_automations::{CatalystClient, CatalystConfig, emit};

#[derive(Parser)]
#[command(name = "assign-ticket")]
#[command(about = "Assign a ticket to a random user")]
struct Args {
    /// Record event as JSON, with the ticket under `record`
    event: String,

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

    let event: RecordEvent = serde_json::from_str(&args.event).context("invalid record event")?;

    let config = CatalystConfig::from_env()?;
    let client = CatalystClient::from_env_config(&config)?;

    let updated = scripts::assign_ticket(&client, &event).await?;
    emit(&updated)?;
    Ok(())
}
