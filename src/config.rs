use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::message::MigratePayload;

pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";

/// Typed view of the loosely shaped `secrets` map of an automation message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    pub catalyst_apiurl: Option<String>,
    pub catalyst_apikey: Option<String>,
    pub minio_host: Option<String>,
    pub minio_access_key: Option<String>,
    pub minio_secret_key: Option<String>,
    pub minio_secure: Option<bool>,
    pub minio_region: Option<String>,
    pub vt_api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    secrets: Secrets,
}

impl Secrets {
    /// Loads the `[secrets]` table of a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: SecretsFile = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })?;
        Ok(file.secrets)
    }

    /// Fills every unset value from `fallback`.
    pub fn or(self, fallback: Secrets) -> Secrets {
        Secrets {
            catalyst_apiurl: self.catalyst_apiurl.or(fallback.catalyst_apiurl),
            catalyst_apikey: self.catalyst_apikey.or(fallback.catalyst_apikey),
            minio_host: self.minio_host.or(fallback.minio_host),
            minio_access_key: self.minio_access_key.or(fallback.minio_access_key),
            minio_secret_key: self.minio_secret_key.or(fallback.minio_secret_key),
            minio_secure: self.minio_secure.or(fallback.minio_secure),
            minio_region: self.minio_region.or(fallback.minio_region),
            vt_api_key: self.vt_api_key.or(fallback.vt_api_key),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn required(value: Option<&str>, name: &'static str) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn base_url(value: Option<&str>, name: &'static str) -> Result<String, ConfigError> {
    let url = required(value, name)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name,
            message: format!("`{}` is not an http(s) url", url),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Ticketing API settings of the webhook programs, read from the environment.
#[derive(Debug, Clone)]
pub struct CatalystConfig {
    pub app_url: String,
    pub token: String,
}

impl CatalystConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app_url: base_url(lookup("CATALYST_APP_URL").as_deref(), "CATALYST_APP_URL")?,
            token: required(lookup("CATALYST_TOKEN").as_deref(), "CATALYST_TOKEN")?,
        })
    }
}

/// Ticketing API settings of the automation programs, read from the message secrets.
#[derive(Debug, Clone)]
pub struct AutomationApiConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl AutomationApiConfig {
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: base_url(secrets.catalyst_apiurl.as_deref(), "catalyst_apiurl")?,
            api_key: required(secrets.catalyst_apikey.as_deref(), "catalyst_apikey")?,
            timeout: secrets.timeout(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub host: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
    pub region: String,
}

impl StorageConfig {
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        Ok(Self {
            host: required(secrets.minio_host.as_deref(), "minio_host")?,
            access_key: required(secrets.minio_access_key.as_deref(), "minio_access_key")?,
            secret_key: required(secrets.minio_secret_key.as_deref(), "minio_secret_key")?,
            secure: secrets.minio_secure.unwrap_or(true),
            region: secrets
                .minio_region
                .clone()
                .unwrap_or_else(|| DEFAULT_STORAGE_REGION.to_string()),
        })
    }

    /// The host may be given bare (`minio:9000`) or as a full url.
    pub fn endpoint_url(&self) -> String {
        if self.host.contains("://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{}://{}", scheme, self.host)
        }
    }
}

#[derive(Debug, Clone)]
pub struct VirusTotalConfig {
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl VirusTotalConfig {
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required(secrets.vt_api_key.as_deref(), "vt_api_key")?,
            timeout: secrets.timeout(),
        })
    }
}

/// Everything a migration run needs, validated before any remote call is made.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub thehive_url: String,
    pub thehive_key: String,
    pub keep_ids: bool,
    pub skip_files: bool,
    pub catalyst: AutomationApiConfig,
    /// Present exactly when attachments are transferred.
    pub storage: Option<StorageConfig>,
}

impl MigrationConfig {
    pub fn new(payload: &MigratePayload, secrets: &Secrets) -> Result<Self, ConfigError> {
        let thehive_url = base_url(Some(&payload.thehiveurl), "thehiveurl")?;
        let thehive_key = required(Some(&payload.thehivekey), "thehivekey")?;
        let catalyst = AutomationApiConfig::from_secrets(secrets)?;

        let storage = if payload.skip_files {
            None
        } else {
            Some(StorageConfig::from_secrets(secrets)?)
        };

        Ok(Self {
            thehive_url,
            thehive_key,
            keep_ids: payload.keep_ids,
            skip_files: payload.skip_files,
            catalyst,
            storage,
        })
    }
}
