use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use catalyst_automations::{DefaultPayload, Message, Secrets, emit, scripts};

#[derive(Parser)]
#[command(name = "post-comment")]
#[command(about = "Comment on the ticket the automation runs for")]
struct Args {
    /// Automation message as JSON
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

    let done = scripts::post_comment(&message).await?;
    emit(&done)?;
    Ok(())
}
