use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

use catalyst_automations::{DefaultPayload, Message, emit, scripts};

fn main() -> Result<()> {
    let matches = Command::new("hash-string")
        .version("1.0")
        .about("Hash the payload of an automation message with SHA-1")
        .arg(
            Arg::new("message")
                .help("Automation message as JSON")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let raw = matches.get_one::<String>("message").context("missing message")?;
    let message: Message<DefaultPayload> = Message::parse(raw)?;

    emit(&scripts::hash_string(&message.payload.default))?;
    Ok(())
}
