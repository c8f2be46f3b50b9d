//! Driving port for ticket mutations.
//!
//! Every request carries the acting user resolved by the inbound adapter.
//! Implementations gate each mutation through the authorization policy
//! before touching storage.

use async_trait::async_trait;

use crate::domain::workflow::TicketChanges;
use crate::domain::{CommentId, Error, TicketId, TicketPriority, UserId};

use super::{CommentPayload, TicketPayload};

/// Open a new ticket owned by `actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    pub actor: UserId,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
}

/// Change title, description or priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicketRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
    pub changes: TicketChanges,
}

/// Attach `assignee_id` to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignTicketRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
    pub assignee_id: UserId,
}

/// A ticket-scoped action with no further input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketActionRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
}

/// Add a comment authored by `actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
    pub content: String,
}

/// Detach a comment from its ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteCommentRequest {
    pub actor: UserId,
    pub ticket_id: TicketId,
    pub comment_id: CommentId,
}

/// Write-side ticket operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    async fn create(&self, request: CreateTicketRequest) -> Result<TicketPayload, Error>;

    async fn update(&self, request: UpdateTicketRequest) -> Result<TicketPayload, Error>;

    async fn delete(&self, request: TicketActionRequest) -> Result<(), Error>;

    async fn assign(&self, request: AssignTicketRequest) -> Result<TicketPayload, Error>;

    async fn unassign(&self, request: TicketActionRequest) -> Result<TicketPayload, Error>;

    async fn start(&self, request: TicketActionRequest) -> Result<TicketPayload, Error>;

    async fn close(&self, request: TicketActionRequest) -> Result<TicketPayload, Error>;

    async fn add_comment(&self, request: AddCommentRequest) -> Result<CommentPayload, Error>;

    async fn delete_comment(&self, request: DeleteCommentRequest) -> Result<(), Error>;
}
