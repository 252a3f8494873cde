pub mod catalyst;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod message;
pub mod migrate;
pub mod scripts;
pub mod storage;
pub mod thehive;
pub mod virustotal;

pub use catalyst::{CatalystClient, Ticket, TicketSink};
pub use config::{CatalystConfig, MigrationConfig, Secrets};
pub use error::{ApiError, ConfigError, Error, Result, StorageError};
pub use message::{DefaultPayload, Done, Message, MigratePayload, emit};
pub use migrate::{Migration, MigrationOptions, MigrationReport};
pub use storage::{ObjectStore, S3Store};
pub use thehive::{LegacySource, TheHiveClient};
pub use virustotal::VirusTotalClient;
