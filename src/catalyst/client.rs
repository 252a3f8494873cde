use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::TicketSink;
use super::model::{NewComment, Ticket};
use crate::config::{AutomationApiConfig, CatalystConfig};
use crate::error::ApiError;
use crate::http::{self, Authentication};

/// Client of the Catalyst REST API.
///
/// Webhook programs talk to the record API under `/api` with a bearer token;
/// automations talk to the ticket API (`/tickets...`) below the configured
/// api url with a private token.
pub struct CatalystClient {
    client: reqwest::Client,
    url: String,
}

/// List endpoints answer with either a bare array or a page of items.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Records(Vec<Value>),
    Page { items: Vec<Value> },
}

impl Listing {
    fn into_records(self) -> Vec<Value> {
        match self {
            Listing::Records(records) => records,
            Listing::Page { items } => items,
        }
    }
}

impl CatalystClient {
    pub fn new(url: &str, auth: Authentication, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::build_client(Some(&auth), timeout)?,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env_config(config: &CatalystConfig) -> Result<Self, ApiError> {
        Self::new(&config.app_url, Authentication::Bearer(config.token.clone()), None)
    }

    pub fn from_automation_config(config: &AutomationApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_url,
            Authentication::PrivateToken(config.api_key.clone()),
            config.timeout,
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    async fn list(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        let response = http::send(self.client.get(self.endpoint(path))).await?;
        let listing: Listing = http::json(response).await?;
        Ok(listing.into_records())
    }

    pub async fn list_tickets(&self) -> Result<Vec<Value>, ApiError> {
        self.list("/api/tickets").await
    }

    pub async fn list_users(&self) -> Result<Vec<Value>, ApiError> {
        self.list("/api/users").await
    }

    pub async fn create_ticket<T: Serialize + ?Sized>(&self, ticket: &T) -> Result<Value, ApiError> {
        let request = self.client.post(self.endpoint("/api/tickets")).json(ticket);
        http::json_or_empty(http::send(request).await?).await
    }

    pub async fn update_ticket<T: Serialize + ?Sized>(&self, id: &str, patch: &T) -> Result<Value, ApiError> {
        let request = self
            .client
            .patch(self.endpoint(&format!("/api/tickets/{}", id)))
            .json(patch);
        http::json_or_empty(http::send(request).await?).await
    }

    pub async fn delete_ticket(&self, id: &str) -> Result<(), ApiError> {
        let request = self.client.delete(self.endpoint(&format!("/api/tickets/{}", id)));
        http::send(request).await?;
        Ok(())
    }

    pub async fn create_tickets_batch(&self, tickets: &[Ticket]) -> Result<(), ApiError> {
        info!("creating {} tickets", tickets.len());
        let request = self.client.post(self.endpoint("/tickets/batch")).json(tickets);
        http::send(request).await?;
        Ok(())
    }

    pub async fn delete_ticket_by_number(&self, id: i64) -> Result<bool, ApiError> {
        let request = self.client.delete(self.endpoint(&format!("/tickets/{}", id)));
        match http::send(request).await {
            Ok(_) => Ok(true),
            Err(err) if err.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
                debug!("ticket {} did not exist", id);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn add_comment(&self, ticket_id: i64, comment: &NewComment) -> Result<Value, ApiError> {
        let request = self
            .client
            .post(self.endpoint(&format!("/tickets/{}/comments", ticket_id)))
            .json(comment);
        http::json_or_empty(http::send(request).await?).await
    }
}

#[async_trait]
impl TicketSink for CatalystClient {
    async fn create_tickets(&self, tickets: &[Ticket]) -> Result<(), ApiError> {
        self.create_tickets_batch(tickets).await
    }

    async fn remove_ticket(&self, id: i64) -> Result<bool, ApiError> {
        self.delete_ticket_by_number(id).await
    }
}
