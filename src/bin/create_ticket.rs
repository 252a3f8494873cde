use anyhow::{Context, Result};
use clap::Parser;

use catalyst_automations::scripts::{self, WebhookEvent};
use catalyst_automations::{CatalystClient, CatalystConfig, emit};

#[derive(Parser)]
#[command(name = "create-ticket")]
#[command(about = "Create an alert ticket from a webhook event")]
struct Args {
    /// Webhook event as JSON; its `body` holds the ticket name
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

    let event: WebhookEvent = serde_json::from_str(&args.event).context("invalid webhook event")?;

    let config = CatalystConfig::from_env()?;
    let client = CatalystClient::from_env_config(&config)?;

    let created = scripts::create_ticket(&client, &event).await?;
    emit(&created)?;
    Ok(())
}
