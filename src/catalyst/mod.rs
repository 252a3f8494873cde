pub mod client;
pub mod model;

use async_trait::async_trait;

use crate::error::ApiError;

pub use client::CatalystClient;
pub use model::{
    Artifact, ArtifactStatus, Comment, FileRef, NewComment, Reference, Ticket, TicketStatus, TicketType,
    bucket_name,
};

/// Write access to the ticketing system used by the migration.
#[async_trait]
pub trait TicketSink: Send + Sync {
    /// Creates all tickets in one request.
    async fn create_tickets(&self, tickets: &[Ticket]) -> Result<(), ApiError>;

    /// Deletes a ticket by its numeric id; `false` when it did not exist.
    async fn remove_ticket(&self, id: i64) -> Result<bool, ApiError>;
}
