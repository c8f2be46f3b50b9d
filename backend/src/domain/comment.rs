//! Comments attached to tickets.
//!
//! A comment belongs to exactly one author and at most one ticket. Removing a
//! comment from its ticket detaches it (the ticket reference becomes `None`)
//! rather than deleting it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{TicketId, UserId};

/// Stable comment identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct CommentId(Uuid);

impl CommentId {
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text note left on a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    content: String,
    created_at: DateTime<Utc>,
    author_id: UserId,
    ticket_id: Option<TicketId>,
}

impl Comment {
    /// Create a detached comment. Attach it with [`crate::domain::Ticket::add_comment`].
    pub fn new(
        id: CommentId,
        content: impl Into<String>,
        author_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            created_at,
            author_id,
            ticket_id: None,
        }
    }

    /// Rebuild a comment from storage, keeping its ticket reference as stored.
    pub fn restore(
        id: CommentId,
        content: impl Into<String>,
        author_id: UserId,
        created_at: DateTime<Utc>,
        ticket_id: Option<TicketId>,
    ) -> Self {
        Self {
            ticket_id,
            ..Self::new(id, content, author_id, created_at)
        }
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Parent ticket, or `None` once the comment has been detached.
    pub fn ticket_id(&self) -> Option<&TicketId> {
        self.ticket_id.as_ref()
    }

    pub(crate) fn set_ticket_id(&mut self, ticket_id: Option<TicketId>) {
        self.ticket_id = ticket_id;
    }
}
