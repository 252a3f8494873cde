use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::config::VirusTotalConfig;
use crate::error::ApiError;
use crate::http;

pub const VIRUSTOTAL_URL: &str = "https://www.virustotal.com";

/// Client of the VirusTotal v2 file report API.
pub struct VirusTotalClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl VirusTotalClient {
    pub fn new(api_key: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Self::with_url(VIRUSTOTAL_URL, api_key, timeout)
    }

    pub fn with_url(url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Ok(Self {
            // the key travels as a query parameter, not a header
            client: http::build_client(None, timeout)?,
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &VirusTotalConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_key, config.timeout)
    }

    /// Looks up the report of a file by its md5, sha1 or sha256 hash.
    pub async fn file_report(&self, resource: &str) -> Result<Value, ApiError> {
        debug!("fetching file report for {}", resource);
        let request = self
            .client
            .get(format!("{}/vtapi/v2/file/report", self.url))
            .query(&[("apikey", self.api_key.as_str()), ("resource", resource)]);
        http::json_or_empty(http::send(request).await?).await
    }
}
