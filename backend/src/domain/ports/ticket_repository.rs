//! Port for ticket aggregate persistence.

use async_trait::async_trait;

use crate::domain::{Ticket, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ticket repository adapters.
    pub enum TicketRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
    }
}

/// Load and store whole ticket aggregates, comments included.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Fetch a ticket with its attached comments.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Insert or replace the ticket and its comments in one transaction.
    ///
    /// Comments present in storage but absent from the aggregate are
    /// detached, not deleted.
    async fn save(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    /// Remove a ticket. Returns `false` when nothing was stored under `id`.
    async fn delete(&self, id: &TicketId) -> Result<bool, TicketRepositoryError>;

    /// Tickets whose owner is `owner`, oldest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Tickets currently assigned to `assignee`, oldest first.
    async fn list_by_assignee(
        &self,
        assignee: &UserId,
    ) -> Result<Vec<Ticket>, TicketRepositoryError>;
}
