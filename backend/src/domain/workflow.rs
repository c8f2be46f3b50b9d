//! Ticket workflow operations.
//!
//! Each operation consults [`crate::domain::policy`] first, then the status
//! machine, and only then mutates the ticket. A failed check leaves the
//! ticket untouched.
//!
//! ```text
//! pending --(first assignment)--> waiting --start--> in_progress --close--> done
//! ```

use chrono::{DateTime, Utc};

use crate::domain::policy::{CommentAction, TicketAction, allows_comment, allows_ticket};
use crate::domain::{
    Comment, CommentId, Ticket, TicketPriority, TicketStatus, User, UserId, link_assignee,
    unlink_assignee,
};

/// Reasons a workflow operation refused to run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The actor lacks the capability for this action.
    #[error("{actor} may not {action:?} ticket")]
    AccessDenied { actor: UserId, action: TicketAction },
    /// The actor is not the author of the comment.
    #[error("{actor} may not delete comment {comment}")]
    CommentAccessDenied { actor: UserId, comment: CommentId },
    /// The current status does not allow the requested move.
    #[error("cannot move ticket from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },
    /// The comment is not attached to this ticket.
    #[error("comment {comment} not found on ticket")]
    MissingComment { comment: CommentId },
}

/// Optional field changes applied by [`edit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
}

/// Fail with [`WorkflowError::AccessDenied`] unless the policy grants
/// `action` to `actor`.
pub fn ensure_allowed(
    ticket: &Ticket,
    actor: &UserId,
    action: TicketAction,
) -> Result<(), WorkflowError> {
    if allows_ticket(actor, ticket, action) {
        Ok(())
    } else {
        Err(WorkflowError::AccessDenied {
            actor: *actor,
            action,
        })
    }
}

/// Apply field changes. Status and assignment are left alone.
pub fn edit(
    ticket: &mut Ticket,
    actor: &UserId,
    changes: TicketChanges,
) -> Result<(), WorkflowError> {
    ensure_allowed(ticket, actor, TicketAction::Edit)?;
    let TicketChanges {
        title,
        description,
        priority,
    } = changes;
    if let Some(title) = title {
        ticket.set_title(title);
    }
    if let Some(description) = description {
        ticket.set_description(description);
    }
    if let Some(priority) = priority {
        ticket.set_priority(priority);
    }
    Ok(())
}

/// Attach `assignee`, keeping both sides of the link in step. `previous` is
/// the user currently assigned, when it differs from `assignee`.
///
/// Status is not checked; assigning a pending ticket advances it to waiting.
pub fn assign(
    ticket: &mut Ticket,
    actor: &UserId,
    assignee: &mut User,
    previous: Option<&mut User>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    ensure_allowed(ticket, actor, TicketAction::Edit)?;
    link_assignee(ticket, assignee, previous, now);
    Ok(())
}

/// Clear the assignee on both sides. Assignment timestamps and status are
/// kept.
pub fn unassign(
    ticket: &mut Ticket,
    actor: &UserId,
    previous: Option<&mut User>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    ensure_allowed(ticket, actor, TicketAction::Edit)?;
    unlink_assignee(ticket, previous, now);
    Ok(())
}

/// Move a waiting ticket into progress. Only the assignee may start it.
pub fn start(ticket: &mut Ticket, actor: &UserId) -> Result<(), WorkflowError> {
    advance(ticket, actor, TicketAction::Start, TicketStatus::InProgress)
}

/// Finish an in-progress ticket. Only the assignee may close it.
pub fn close(ticket: &mut Ticket, actor: &UserId) -> Result<(), WorkflowError> {
    advance(ticket, actor, TicketAction::Close, TicketStatus::Done)
}

fn advance(
    ticket: &mut Ticket,
    actor: &UserId,
    action: TicketAction,
    to: TicketStatus,
) -> Result<(), WorkflowError> {
    ensure_allowed(ticket, actor, action)?;
    let from = ticket.status();
    if !from.can_transition_to(to) {
        return Err(WorkflowError::InvalidTransition { from, to });
    }
    ticket.set_status(to);
    Ok(())
}

/// Detach a comment authored by `actor` and return it.
pub fn remove_comment(
    ticket: &mut Ticket,
    actor: &UserId,
    comment_id: &CommentId,
) -> Result<Comment, WorkflowError> {
    let comment = ticket
        .comment(comment_id)
        .ok_or(WorkflowError::MissingComment {
            comment: *comment_id,
        })?;
    if !allows_comment(actor, comment, CommentAction::Delete) {
        return Err(WorkflowError::CommentAccessDenied {
            actor: *actor,
            comment: *comment_id,
        });
    }
    ticket
        .remove_comment(comment_id)
        .ok_or(WorkflowError::MissingComment {
            comment: *comment_id,
        })
}

#[cfg(test)]
mod tests;
