//! Keep the user-side ticket views in step with ticket references.
//!
//! The ticket's owner and assignee fields are the owning side; the user's
//! owned/assigned sets are the inverse. Both sides are updated together here.
//! The `previous` user is only detached when it really is the user the ticket
//! pointed at before the change.

use chrono::{DateTime, Utc};

use crate::domain::{Ticket, User};

/// Record `owner` as the ticket owner on both sides, detaching the ticket
/// from the `previous` owner.
pub fn link_owner(ticket: &mut Ticket, owner: &mut User, previous: Option<&mut User>) {
    if let Some(previous) = previous
        .filter(|previous| previous.id() == ticket.owner_id() && previous.id() != owner.id())
    {
        previous.detach_owned(&ticket.id());
    }
    ticket.set_owner(*owner.id());
    owner.attach_owned(ticket.id());
}

/// Attach `assignee` to the ticket on both sides, applying the assignment
/// side effects described on [`Ticket::set_assignee`]. A replaced assignee
/// loses the ticket from its assigned set.
pub fn link_assignee(
    ticket: &mut Ticket,
    assignee: &mut User,
    previous: Option<&mut User>,
    now: DateTime<Utc>,
) {
    if let Some(previous) = previous.filter(|previous| {
        ticket.assignee_id() == Some(previous.id()) && previous.id() != assignee.id()
    }) {
        previous.detach_assigned(&ticket.id());
    }
    ticket.set_assignee(Some(*assignee.id()), now);
    assignee.attach_assigned(ticket.id());
}

/// Clear the assignee on both sides. Assignment timestamps are untouched.
pub fn unlink_assignee(ticket: &mut Ticket, previous: Option<&mut User>, now: DateTime<Utc>) {
    if let Some(previous) = previous.filter(|previous| ticket.assignee_id() == Some(previous.id()))
    {
        previous.detach_assigned(&ticket.id());
    }
    ticket.set_assignee(None, now);
}
