//! Authorization policy for ticket and comment mutations.
//!
//! Assignment is owner-only: editing a ticket (which covers updating its
//! fields, assigning and unassigning) and deleting it are granted to the
//! ticket owner alone. Starting and closing work belong to the current
//! assignee. Comments may be removed only by their author.
//!
//! Every check is a pure function over the acting user and a snapshot of the
//! resource, so callers evaluate it before mutating anything.

use crate::domain::{Comment, Ticket, UserId};

/// Actions gated on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    /// Update fields, assign, or unassign.
    Edit,
    /// Remove the ticket.
    Delete,
    /// Move a waiting ticket into progress.
    Start,
    /// Finish an in-progress ticket.
    Close,
}

/// Actions gated on a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Delete,
}

/// Decide whether `actor` may perform `action` on `ticket`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use ticket_desk::domain::policy::{TicketAction, allows_ticket};
/// use ticket_desk::domain::{NewTicket, Ticket, TicketId, TicketPriority, UserId};
///
/// let owner = UserId::random();
/// let ticket = Ticket::open(
///     TicketId::random(),
///     NewTicket {
///         title: "Broken chair".into(),
///         description: "Wobbles".into(),
///         priority: TicketPriority::Low,
///         owner_id: owner,
///     },
///     Utc::now(),
/// );
/// assert!(allows_ticket(&owner, &ticket, TicketAction::Edit));
/// assert!(!allows_ticket(&UserId::random(), &ticket, TicketAction::Delete));
/// ```
#[must_use]
pub fn allows_ticket(actor: &UserId, ticket: &Ticket, action: TicketAction) -> bool {
    match action {
        TicketAction::Edit | TicketAction::Delete => ticket.owner_id() == actor,
        TicketAction::Start | TicketAction::Close => ticket.assignee_id() == Some(actor),
    }
}

/// Decide whether `actor` may perform `action` on `comment`.
#[must_use]
pub fn allows_comment(actor: &UserId, comment: &Comment, action: CommentAction) -> bool {
    match action {
        CommentAction::Delete => comment.author_id() == actor,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{CommentId, NewTicket, TicketId, TicketPriority};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    struct Cast {
        owner: UserId,
        assignee: UserId,
        stranger: UserId,
        ticket: Ticket,
    }

    #[fixture]
    fn cast() -> Cast {
        let owner = UserId::random();
        let assignee = UserId::random();
        let mut ticket = Ticket::open(
            TicketId::random(),
            NewTicket {
                title: "Laptop fan".into(),
                description: "Loud".into(),
                priority: TicketPriority::Normal,
                owner_id: owner,
            },
            Utc::now(),
        );
        ticket.set_assignee(Some(assignee), Utc::now());
        Cast {
            owner,
            assignee,
            stranger: UserId::random(),
            ticket,
        }
    }

    #[rstest]
    #[case(TicketAction::Edit)]
    #[case(TicketAction::Delete)]
    fn owner_only_actions(cast: Cast, #[case] action: TicketAction) {
        assert!(allows_ticket(&cast.owner, &cast.ticket, action));
        assert!(!allows_ticket(&cast.assignee, &cast.ticket, action));
        assert!(!allows_ticket(&cast.stranger, &cast.ticket, action));
    }

    #[rstest]
    #[case(TicketAction::Start)]
    #[case(TicketAction::Close)]
    fn assignee_only_actions(cast: Cast, #[case] action: TicketAction) {
        assert!(allows_ticket(&cast.assignee, &cast.ticket, action));
        assert!(!allows_ticket(&cast.owner, &cast.ticket, action));
        assert!(!allows_ticket(&cast.stranger, &cast.ticket, action));
    }

    #[rstest]
    fn unassigned_ticket_cannot_be_started(mut cast: Cast) {
        cast.ticket.set_assignee(None, Utc::now());
        assert!(!allows_ticket(&cast.assignee, &cast.ticket, TicketAction::Start));
    }

    #[rstest]
    fn only_author_deletes_comment(cast: Cast) {
        let comment = Comment::new(CommentId::random(), "noted", cast.stranger, Utc::now());
        assert!(allows_comment(&cast.stranger, &comment, CommentAction::Delete));
        assert!(!allows_comment(&cast.owner, &comment, CommentAction::Delete));
    }
}
