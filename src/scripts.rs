//! The small webhook and automation programs, one function each.
//!
//! Binaries only parse arguments, build clients and print what these return.

use log::info;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha1::{Digest, Sha1};

use crate::catalyst::{CatalystClient, NewComment};
use crate::config::AutomationApiConfig;
use crate::error::{Error, Result};
use crate::message::{DefaultPayload, Done, Message};
use crate::virustotal::VirusTotalClient;

/// Author of comments written by automations.
pub const AUTOMATION_CREATOR: &str = "automation";

/// Name of the ticket left behind by [`reset_tickets`].
pub const NEW_TICKET_NAME: &str = "New Ticket";

/// A webhook call as forwarded to a script; `body` is the raw request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct NewTicketRequest {
    name: String,
}

/// A record change event, as sent by ticket hooks.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEvent {
    pub record: RecordRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResult {
    pub hash: String,
}

/// Creates an open alert ticket named after the webhook body's `name`.
pub async fn create_ticket(client: &CatalystClient, event: &WebhookEvent) -> Result<Value> {
    let request: NewTicketRequest = serde_json::from_str(&event.body)
        .map_err(|e| Error::Input(format!("invalid webhook body: {}", e)))?;

    open_alert(client, &request.name).await
}

async fn open_alert(client: &CatalystClient, name: &str) -> Result<Value> {
    info!("🎫 creating alert ticket {:?}", name);
    let created = client
        .create_ticket(&json!({
            "name": name,
            "type": "alert",
            "open": true,
        }))
        .await?;
    Ok(created)
}

/// Deletes every ticket, then creates a single open alert named [`NEW_TICKET_NAME`].
pub async fn reset_tickets(client: &CatalystClient) -> Result<Value> {
    let tickets = client.list_tickets().await?;

    info!("🗑️  deleting {} tickets", tickets.len());
    for ticket in &tickets {
        let id = ticket
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Input(format!("ticket without id: {}", ticket)))?;
        client.delete_ticket(id).await?;
    }

    open_alert(client, NEW_TICKET_NAME).await
}

/// Picks the owner for a ticket among the known users.
pub fn pick_owner<R: Rng + ?Sized>(users: &[Value], rng: &mut R) -> Result<String> {
    let user = users
        .choose(rng)
        .ok_or_else(|| Error::Input("there are no users to assign the ticket to".to_string()))?;
    user.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Input(format!("user without id: {}", user)))
}

/// Assigns the ticket of a record event to a random user.
pub async fn assign_ticket(client: &CatalystClient, event: &RecordEvent) -> Result<Value> {
    let users = client.list_users().await?;
    let owner = pick_owner(&users, &mut rand::rng())?;

    info!("👤 assigning ticket {} to {}", event.record.id, owner);
    let updated = client
        .update_ticket(&event.record.id, &json!({ "owner": owner }))
        .await?;
    Ok(updated)
}

pub fn hash_string(input: &str) -> HashResult {
    HashResult {
        hash: hex::encode(Sha1::digest(input.as_bytes())),
    }
}

/// Comments the payload on the ticket the automation runs for, if any.
pub async fn post_comment(message: &Message<DefaultPayload>) -> Result<Done> {
    let Some(ticket) = &message.context.ticket else {
        info!("no ticket in context, nothing to comment on");
        return Ok(Done::new());
    };

    let config = AutomationApiConfig::from_secrets(&message.secrets)?;
    let client = CatalystClient::from_automation_config(&config)?;
    let comment = NewComment {
        message: message.payload.default.clone(),
        creator: AUTOMATION_CREATOR.to_string(),
    };

    info!("💬 commenting on ticket {}", ticket.id);
    client.add_comment(ticket.id, &comment).await?;
    Ok(Done::new())
}

/// Returns VirusTotal's report for the hash in the payload, unchanged.
pub async fn vt_hash(client: &VirusTotalClient, message: &Message<DefaultPayload>) -> Result<Value> {
    let report = client.file_report(&message.payload.default).await?;
    Ok(report)
}
