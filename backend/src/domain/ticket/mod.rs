//! Ticket aggregate.
//!
//! The ticket owns its lifecycle fields and the coupling between assignment
//! and status. Timestamps for creation and assignment are side effects of
//! construction and [`Ticket::set_assignee`]; callers never set them directly.
//!
//! Setters here are deliberately unchecked with respect to the workflow:
//! [`Ticket::set_status`] performs a plain assignment and transition rules
//! live in [`crate::domain::workflow`]. Field constraints (blank titles,
//! lengths) are reported by the validation port, not enforced by setters.

mod links;
mod status;

pub use links::{link_assignee, link_owner, unlink_assignee};
pub use status::{ParseEnumError, TicketPriority, TicketStatus};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Comment, CommentId, UserId};

/// Stable ticket identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct TicketId(Uuid);

impl TicketId {
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

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by ticket mutation and rehydration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    /// A write-once field was written a second time.
    #[error("{field} is immutable")]
    ImmutableField { field: &'static str },
    /// Stored assignment timestamps contradict the assignment history rules.
    #[error("inconsistent assignment timestamps: {reason}")]
    InconsistentAssignment { reason: &'static str },
    /// A stored comment points at a different ticket.
    #[error("comment {comment} belongs to another ticket")]
    ForeignComment { comment: CommentId },
}

/// Caller-supplied fields for a brand new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub owner_id: UserId,
}

/// Complete stored state used to rehydrate a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
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
    pub comments: Vec<Comment>,
}

/// Ticket aggregate root.
///
/// ## Invariants
/// - `created_at` is set once at construction and never changes.
/// - `assigned_at_first` is `None` iff the ticket has never had an assignee;
///   once set it never changes.
/// - `assigned_at_last >= assigned_at_first` whenever both are set.
/// - A ticket with an assignee has both assignment timestamps.
/// - Every comment in the aggregate references this ticket.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use ticket_desk::domain::{NewTicket, Ticket, TicketId, TicketPriority, TicketStatus, UserId};
///
/// let owner = UserId::random();
/// let ticket = Ticket::open(
///     TicketId::random(),
///     NewTicket {
///         title: "Printer on fire".into(),
///         description: "Third floor".into(),
///         priority: TicketPriority::High,
///         owner_id: owner,
///     },
///     Utc::now(),
/// );
/// assert_eq!(ticket.status(), TicketStatus::Pending);
/// assert!(ticket.assignee_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: TicketId,
    title: String,
    description: String,
    priority: TicketPriority,
    status: TicketStatus,
    created_at: DateTime<Utc>,
    owner_id: UserId,
    assignee_id: Option<UserId>,
    assigned_at_first: Option<DateTime<Utc>>,
    assigned_at_last: Option<DateTime<Utc>>,
    comments: BTreeMap<CommentId, Comment>,
}

impl Ticket {
    /// Open a new ticket in [`TicketStatus::Pending`] with no assignee.
    pub fn open(id: TicketId, new: NewTicket, created_at: DateTime<Utc>) -> Self {
        let NewTicket {
            title,
            description,
            priority,
            owner_id,
        } = new;
        Self {
            id,
            title,
            description,
            priority,
            status: TicketStatus::Pending,
            created_at,
            owner_id,
            assignee_id: None,
            assigned_at_first: None,
            assigned_at_last: None,
            comments: BTreeMap::new(),
        }
    }

    /// Rehydrate a ticket from storage, re-checking the assignment invariants.
    pub fn restore(record: TicketRecord) -> Result<Self, TicketError> {
        let TicketRecord {
            id,
            title,
            description,
            priority,
            status,
            created_at,
            owner_id,
            assignee_id,
            assigned_at_first,
            assigned_at_last,
            comments,
        } = record;

        match (assigned_at_first, assigned_at_last) {
            (None, Some(_)) => {
                return Err(TicketError::InconsistentAssignment {
                    reason: "last assignment recorded without a first",
                });
            }
            (None, None) if assignee_id.is_some() => {
                return Err(TicketError::InconsistentAssignment {
                    reason: "assignee present without assignment timestamps",
                });
            }
            (Some(_), None) => {
                return Err(TicketError::InconsistentAssignment {
                    reason: "first assignment recorded without a last",
                });
            }
            (Some(first), Some(last)) if last < first => {
                return Err(TicketError::InconsistentAssignment {
                    reason: "last assignment precedes the first",
                });
            }
            _ => {}
        }

        let mut ticket = Self {
            id,
            title,
            description,
            priority,
            status,
            created_at,
            owner_id,
            assignee_id,
            assigned_at_first,
            assigned_at_last,
            comments: BTreeMap::new(),
        };
        for comment in comments {
            if comment.ticket_id().is_some_and(|parent| *parent != id) {
                return Err(TicketError::ForeignComment {
                    comment: comment.id(),
                });
            }
            ticket.add_comment(comment);
        }
        Ok(ticket)
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn priority(&self) -> TicketPriority {
        self.priority
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    pub fn assigned_at_first(&self) -> Option<DateTime<Utc>> {
        self.assigned_at_first
    }

    pub fn assigned_at_last(&self) -> Option<DateTime<Utc>> {
        self.assigned_at_last
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_priority(&mut self, priority: TicketPriority) {
        self.priority = priority;
    }

    pub fn set_owner(&mut self, owner_id: UserId) {
        self.owner_id = owner_id;
    }

    /// Overwrite the status without consulting the workflow.
    ///
    /// Use the operations in [`crate::domain::workflow`] for user-driven
    /// transitions; they enforce who may move a ticket and from where.
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }

    /// Attach or clear the assignee.
    ///
    /// Attaching records `now` as the latest assignment, records the first
    /// assignment if there has been none, and advances a pending ticket to
    /// waiting. Clearing only removes the assignee; timestamps and status
    /// stay as they are.
    pub fn set_assignee(&mut self, assignee: Option<UserId>, now: DateTime<Utc>) {
        let Some(assignee) = assignee else {
            self.assignee_id = None;
            return;
        };
        self.assignee_id = Some(assignee);
        self.assigned_at_last = Some(now);
        if self.assigned_at_first.is_none() {
            self.assigned_at_first = Some(now);
        }
        if self.status == TicketStatus::Pending {
            self.status = TicketStatus::Waiting;
        }
    }

    /// Reject any attempt to overwrite the creation timestamp.
    ///
    /// Tickets receive `created_at` on construction, so this always fails
    /// and leaves the stored value untouched.
    pub fn set_created_at(&mut self, _created_at: DateTime<Utc>) -> Result<(), TicketError> {
        Err(TicketError::ImmutableField {
            field: "createdAt",
        })
    }

    /// Attach a comment to this ticket.
    ///
    /// Adding a comment whose id is already present is a no-op and returns
    /// `false`.
    pub fn add_comment(&mut self, mut comment: Comment) -> bool {
        if self.comments.contains_key(&comment.id()) {
            return false;
        }
        comment.set_ticket_id(Some(self.id));
        self.comments.insert(comment.id(), comment);
        true
    }

    /// Detach a comment from this ticket and hand it back.
    ///
    /// The detached comment's ticket reference is cleared only if it still
    /// pointed at this ticket.
    pub fn remove_comment(&mut self, comment_id: &CommentId) -> Option<Comment> {
        let mut comment = self.comments.remove(comment_id)?;
        if comment.ticket_id() == Some(&self.id) {
            comment.set_ticket_id(None);
        }
        Some(comment)
    }

    pub fn comment(&self, comment_id: &CommentId) -> Option<&Comment> {
        self.comments.get(comment_id)
    }

    /// Comments ordered by id.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.values()
    }
}
