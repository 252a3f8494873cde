use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use catalyst_automations::{
    CatalystClient, Done, Message, Migration, MigrationConfig, MigrationOptions, MigratePayload, ObjectStore,
    S3Store, Secrets, TheHiveClient, emit,
};

#[derive(Parser)]
#[command(name = "thehive-migrate")]
#[command(about = "Migrate alerts and cases from TheHive into Catalyst")]
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

    let message: Message<MigratePayload> = Message::parse(&args.message)?;
    let secrets = match &args.secrets {
        Some(path) => message.secrets.clone().or(Secrets::from_file(path)?),
        None => message.secrets.clone(),
    };

    let config = MigrationConfig::new(&message.payload, &secrets).context("invalid migration settings")?;

    info!("🚀 Migrating {} into {}", config.thehive_url, config.catalyst.api_url);
    info!("keep ids: {}, skip files: {}", config.keep_ids, config.skip_files);

    let thehive = TheHiveClient::new(&config.thehive_url, &config.thehive_key, config.catalyst.timeout)?;
    let catalyst = CatalystClient::from_automation_config(&config.catalyst)?;
    let store = config.storage.as_ref().map(S3Store::new);

    let migration = Migration::new(
        &thehive,
        &catalyst,
        store.as_ref().map(|s| s as &dyn ObjectStore),
        MigrationOptions::from(&config),
    );
    migration.run().await.context("migration failed")?;

    emit(&Done::new())?;
    Ok(())
}
