use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::LegacySource;
use super::model::{HiveAlert, HiveCase, HiveObservable, HiveTask, HiveTaskLog};
use crate::error::ApiError;
use crate::http::{self, Authentication};

/// Sort key applied to every search, newest first.
const SORT_NEWEST_FIRST: &str = "-createdAt";
/// Range marker for an unpaginated search.
const RANGE_ALL: &str = "all";

pub struct TheHiveClient {
    client: reqwest::Client,
    url: String,
}

impl TheHiveClient {
    pub fn new(url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let auth = Authentication::Bearer(api_key.to_string());
        Ok(Self {
            client: http::build_client(Some(&auth), timeout)?,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    async fn search<T: DeserializeOwned>(&self, path: &str, query: Value) -> Result<Vec<T>, ApiError> {
        debug!("searching {} with {}", path, query);
        let request = self
            .client
            .post(format!("{}{}", self.url, path))
            .query(&[("range", RANGE_ALL), ("sort", SORT_NEWEST_FIRST)])
            .json(&json!({ "query": query }));
        http::json(http::send(request).await?).await
    }
}

fn child_of_case(case_id: &str) -> Value {
    json!({
        "_parent": {
            "_type": "case",
            "_query": { "_id": case_id }
        }
    })
}

#[async_trait]
impl LegacySource for TheHiveClient {
    async fn find_alerts(&self) -> Result<Vec<HiveAlert>, ApiError> {
        self.search("/api/alert/_search", json!({})).await
    }

    async fn find_cases(&self) -> Result<Vec<HiveCase>, ApiError> {
        self.search("/api/case/_search", json!({})).await
    }

    async fn case_observables(&self, case_id: &str) -> Result<Vec<HiveObservable>, ApiError> {
        self.search("/api/case/artifact/_search", child_of_case(case_id)).await
    }

    async fn case_tasks(&self, case_id: &str) -> Result<Vec<HiveTask>, ApiError> {
        self.search("/api/case/task/_search", child_of_case(case_id)).await
    }

    async fn task_logs(&self, task_id: &str) -> Result<Vec<HiveTaskLog>, ApiError> {
        let request = self
            .client
            .get(format!("{}/api/case/task/{}/log", self.url, task_id))
            .query(&[("range", RANGE_ALL)]);
        http::json(http::send(request).await?).await
    }

    async fn download_attachment(&self, attachment_id: &str) -> Result<Bytes, ApiError> {
        let request = self
            .client
            .get(format!("{}/api/datastore/{}", self.url, attachment_id));
        http::bytes(http::send(request).await?).await
    }
}
