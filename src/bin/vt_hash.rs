use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use catalyst_automations::config::VirusTotalConfig;
use catalyst_automations::{DefaultPayload, Message, Secrets, VirusTotalClient, emit, scripts};

#[derive(Parser)]
#[command(name = "vt-hash")]
#[command(about = "Look up a file hash on VirusTotal")]
struct Args {
    /// Automation message as JSON, with the hash in `payload.default`
    message: String,

    /// TOML file with a [secrets] table, used for values missing in the message
    #[arg(short, long)]
    secrets: Option<PathBuf>,

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

    let mut message: Message<DefaultPayload> = Message::parse(&args.message)?;
    if let Some(path) = &args.secrets {
        message.secrets = message.secrets.or(Secrets::from_file(path)?);
    }

    let config = VirusTotalConfig::from_secrets(&message.secrets)?;
    let client = VirusTotalClient::from_config(&config)?;

    let report = scripts::vt_hash(&client, &message).await?;
    emit(&report)?;
    Ok(())
}
