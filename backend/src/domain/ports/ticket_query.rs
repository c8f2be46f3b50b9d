//! Driving port for ticket reads, plus the payloads shared with commands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Comment, CommentId, Error, Ticket, TicketId, TicketPriority, TicketStatus, UserId,
};

/// Serializable comment view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub id: CommentId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: UserId,
}

impl From<&Comment> for CommentPayload {
    fn from(value: &Comment) -> Self {
        Self {
            id: value.id(),
            content: value.content().to_owned(),
            created_at: value.created_at(),
            author_id: *value.author_id(),
        }
    }
}

/// Serializable ticket view including comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub assignee_id: Option<UserId>,
    pub assigned_at_first: Option<DateTime<Utc>>,
    pub assigned_at_last: Option<DateTime<Utc>>,
    pub comments: Vec<CommentPayload>,
}

impl From<&Ticket> for TicketPayload {
    fn from(value: &Ticket) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_owned(),
            description: value.description().to_owned(),
            priority: value.priority(),
            status: value.status(),
            created_at: value.created_at(),
            owner_id: *value.owner_id(),
            assignee_id: value.assignee_id().copied(),
            assigned_at_first: value.assigned_at_first(),
            assigned_at_last: value.assigned_at_last(),
            comments: value.comments().map(CommentPayload::from).collect(),
        }
    }
}

/// Compact row used by the owned and assigned listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummaryPayload {
    pub id: TicketId,
    pub title: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
}

impl From<&Ticket> for TicketSummaryPayload {
    fn from(value: &Ticket) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_owned(),
            priority: value.priority(),
            status: value.status(),
        }
    }
}

/// Read-side ticket operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Fetch a ticket by id. Any authenticated actor may read it.
    async fn get_ticket(&self, ticket_id: TicketId) -> Result<TicketPayload, Error>;

    /// Tickets owned by `actor`.
    async fn list_owned(&self, actor: UserId) -> Result<Vec<TicketSummaryPayload>, Error>;

    /// Tickets currently assigned to `actor`.
    async fn list_assigned(&self, actor: UserId) -> Result<Vec<TicketSummaryPayload>, Error>;
}
