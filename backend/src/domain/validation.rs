//! Default field constraints for tickets and comments.

use crate::domain::ports::{TicketValidator, Violation};
use crate::domain::{Comment, Ticket};

/// Maximum ticket title length, in characters.
pub const TITLE_MAX: usize = 255;

/// Constraint-based validator used in production.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use ticket_desk::domain::ports::TicketValidator;
/// use ticket_desk::domain::validation::ConstraintTicketValidator;
/// use ticket_desk::domain::{NewTicket, Ticket, TicketId, TicketPriority, UserId};
///
/// let ticket = Ticket::open(
///     TicketId::random(),
///     NewTicket {
///         title: "  ".into(),
///         description: "Room 4".into(),
///         priority: TicketPriority::Normal,
///         owner_id: UserId::random(),
///     },
///     Utc::now(),
/// );
/// let violations = ConstraintTicketValidator.validate_ticket(&ticket);
/// assert_eq!(violations[0].field, "title");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintTicketValidator;

impl TicketValidator for ConstraintTicketValidator {
    fn validate_ticket(&self, ticket: &Ticket) -> Vec<Violation> {
        let mut violations = Vec::new();
        let title = ticket.title();
        if title.trim().is_empty() {
            violations.push(Violation::new("title", "must not be blank"));
        } else if title.chars().count() > TITLE_MAX {
            violations.push(Violation::new(
                "title",
                format!("must be at most {TITLE_MAX} characters"),
            ));
        }
        if ticket.description().trim().is_empty() {
            violations.push(Violation::new("description", "must not be blank"));
        }
        violations
    }

    fn validate_comment(&self, comment: &Comment) -> Vec<Violation> {
        if comment.content().trim().is_empty() {
            vec![Violation::new("content", "must not be blank")]
        } else {
            Vec::new()
        }
    }
}
