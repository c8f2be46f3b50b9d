//! Port for field-level validation of tickets and comments.
//!
//! Validators report every violation they find rather than stopping at the
//! first; services turn a non-empty list into a `validation_failed` error.

use serde::Serialize;

use crate::domain::{Comment, Ticket};

/// A single field constraint that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Field validation collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait TicketValidator: Send + Sync {
    /// Check the ticket's own fields.
    fn validate_ticket(&self, ticket: &Ticket) -> Vec<Violation>;

    /// Check a comment before it is attached.
    fn validate_comment(&self, comment: &Comment) -> Vec<Violation>;
}
