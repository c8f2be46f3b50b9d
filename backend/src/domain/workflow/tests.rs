//! Regression coverage for workflow operations.

use super::*;
use crate::domain::{DisplayName, Email, NewTicket, PasswordHash, TicketId};
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 30, 0)
        .single()
        .expect("valid fixture timestamp")
        + Duration::minutes(minutes)
}

fn user(email: &str) -> User {
    User::new(
        UserId::random(),
        Email::new(email).expect("valid email"),
        DisplayName::new("Desk user").expect("valid name"),
        PasswordHash::derive("pw").expect("hash"),
    )
}

struct Desk {
    owner: User,
    agent: User,
    bystander: User,
    ticket: Ticket,
}

impl Desk {
    fn assign_agent(&mut self) {
        let owner = *self.owner.id();
        assign(&mut self.ticket, &owner, &mut self.agent, None, at(1)).expect("owner assigns");
    }
}

#[fixture]
fn desk() -> Desk {
    let owner = user("owner@example.com");
    let ticket = Ticket::open(
        TicketId::random(),
        NewTicket {
            title: "Monitor flickers".into(),
            description: "Since Tuesday".into(),
            priority: TicketPriority::Normal,
            owner_id: *owner.id(),
        },
        at(0),
    );
    Desk {
        owner,
        agent: user("agent@example.com"),
        bystander: user("bystander@example.com"),
        ticket,
    }
}

#[rstest]
fn full_lifecycle_reaches_done(mut desk: Desk) {
    assert_eq!(desk.ticket.status(), TicketStatus::Pending);

    desk.assign_agent();
    assert_eq!(desk.ticket.status(), TicketStatus::Waiting);
    assert_eq!(desk.ticket.assigned_at_first(), desk.ticket.assigned_at_last());
    assert!(desk.agent.assigned_tickets().contains(&desk.ticket.id()));

    let agent = *desk.agent.id();
    start(&mut desk.ticket, &agent).expect("assignee starts");
    assert_eq!(desk.ticket.status(), TicketStatus::InProgress);

    close(&mut desk.ticket, &agent).expect("assignee closes");
    assert_eq!(desk.ticket.status(), TicketStatus::Done);
}

#[rstest]
fn only_owner_may_assign(mut desk: Desk) {
    let bystander = *desk.bystander.id();
    let err = assign(&mut desk.ticket, &bystander, &mut desk.agent, None, at(1))
        .expect_err("bystander cannot assign");

    assert!(matches!(
        err,
        WorkflowError::AccessDenied {
            action: TicketAction::Edit,
            ..
        }
    ));
    assert!(desk.ticket.assignee_id().is_none());
    assert!(desk.agent.assigned_tickets().is_empty());
}

#[rstest]
fn assignee_may_not_reassign_or_unassign(mut desk: Desk) {
    desk.assign_agent();
    let agent = *desk.agent.id();

    let err = unassign(&mut desk.ticket, &agent, Some(&mut desk.agent), at(2))
        .expect_err("assignee cannot unassign");
    assert!(matches!(err, WorkflowError::AccessDenied { .. }));
    assert_eq!(desk.ticket.assignee_id(), Some(&agent));
    assert!(desk.agent.assigned_tickets().contains(&desk.ticket.id()));

    let err = assign(&mut desk.ticket, &agent, &mut desk.bystander, None, at(2))
        .expect_err("assignee cannot reassign");
    assert!(matches!(err, WorkflowError::AccessDenied { .. }));
}

#[rstest]
fn unassign_keeps_timestamps_and_status(mut desk: Desk) {
    desk.assign_agent();
    let owner = *desk.owner.id();

    unassign(&mut desk.ticket, &owner, Some(&mut desk.agent), at(5)).expect("owner unassigns");

    assert!(desk.ticket.assignee_id().is_none());
    assert_eq!(desk.ticket.assigned_at_first(), Some(at(1)));
    assert_eq!(desk.ticket.assigned_at_last(), Some(at(1)));
    assert_eq!(desk.ticket.status(), TicketStatus::Waiting);
}

#[rstest]
fn reassignment_and_unassignment_release_the_former_assignee(mut desk: Desk) {
    desk.assign_agent();
    let owner = *desk.owner.id();
    let ticket_id = desk.ticket.id();

    assign(
        &mut desk.ticket,
        &owner,
        &mut desk.bystander,
        Some(&mut desk.agent),
        at(3),
    )
    .expect("owner reassigns");
    assert!(!desk.agent.assigned_tickets().contains(&ticket_id));
    assert!(desk.bystander.assigned_tickets().contains(&ticket_id));

    unassign(&mut desk.ticket, &owner, Some(&mut desk.bystander), at(4)).expect("owner unassigns");
    assert!(desk.bystander.assigned_tickets().is_empty());
    assert!(desk.agent.assigned_tickets().is_empty());
    assert!(desk.ticket.assignee_id().is_none());
}

#[rstest]
fn reassigning_after_start_keeps_status(mut desk: Desk) {
    desk.assign_agent();
    let agent = *desk.agent.id();
    start(&mut desk.ticket, &agent).expect("assignee starts");

    let owner = *desk.owner.id();
    assign(
        &mut desk.ticket,
        &owner,
        &mut desk.bystander,
        Some(&mut desk.agent),
        at(9),
    ).expect("owner reassigns");

    assert_eq!(desk.ticket.status(), TicketStatus::InProgress);
    assert_eq!(desk.ticket.assigned_at_first(), Some(at(1)));
    assert_eq!(desk.ticket.assigned_at_last(), Some(at(9)));
}

#[rstest]
fn stranger_starting_gets_access_denied(mut desk: Desk) {
    desk.assign_agent();
    let bystander = *desk.bystander.id();

    let err = start(&mut desk.ticket, &bystander).expect_err("stranger cannot start");
    assert!(matches!(
        err,
        WorkflowError::AccessDenied {
            action: TicketAction::Start,
            ..
        }
    ));
    assert_eq!(desk.ticket.status(), TicketStatus::Waiting);
}

#[rstest]
fn actor_check_precedes_status_check(mut desk: Desk) {
    desk.assign_agent();
    let bystander = *desk.bystander.id();

    let err = close(&mut desk.ticket, &bystander).expect_err("stranger cannot close");
    assert!(matches!(err, WorkflowError::AccessDenied { .. }));
}

#[rstest]
fn starting_unassigned_pending_ticket_is_denied(mut desk: Desk) {
    let owner = *desk.owner.id();
    let err = start(&mut desk.ticket, &owner).expect_err("no assignee");
    assert!(matches!(err, WorkflowError::AccessDenied { .. }));
}

#[rstest]
fn closing_waiting_ticket_is_invalid(mut desk: Desk) {
    desk.assign_agent();
    let agent = *desk.agent.id();

    let err = close(&mut desk.ticket, &agent).expect_err("must start first");
    assert_eq!(
        err,
        WorkflowError::InvalidTransition {
            from: TicketStatus::Waiting,
            to: TicketStatus::Done,
        }
    );
    assert_eq!(desk.ticket.status(), TicketStatus::Waiting);
}

#[rstest]
fn starting_twice_is_invalid(mut desk: Desk) {
    desk.assign_agent();
    let agent = *desk.agent.id();
    start(&mut desk.ticket, &agent).expect("first start");

    let err = start(&mut desk.ticket, &agent).expect_err("already in progress");
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[rstest]
fn set_status_bypasses_workflow_guard(mut desk: Desk) {
    desk.assign_agent();
    let agent = *desk.agent.id();
    desk.ticket.set_status(TicketStatus::Pending);

    assert!(matches!(
        close(&mut desk.ticket, &agent),
        Err(WorkflowError::InvalidTransition { .. })
    ));

    desk.ticket.set_status(TicketStatus::Done);
    assert_eq!(desk.ticket.status(), TicketStatus::Done);
}

#[rstest]
fn edit_applies_only_supplied_fields(mut desk: Desk) {
    let owner = *desk.owner.id();
    edit(
        &mut desk.ticket,
        &owner,
        TicketChanges {
            priority: Some(TicketPriority::High),
            ..TicketChanges::default()
        },
    )
    .expect("owner edits");

    assert_eq!(desk.ticket.priority(), TicketPriority::High);
    assert_eq!(desk.ticket.title(), "Monitor flickers");
    assert_eq!(desk.ticket.status(), TicketStatus::Pending);
}

#[rstest]
fn edit_by_non_owner_changes_nothing(mut desk: Desk) {
    let bystander = *desk.bystander.id();
    let err = edit(
        &mut desk.ticket,
        &bystander,
        TicketChanges {
            title: Some("Hijacked".into()),
            ..TicketChanges::default()
        },
    )
    .expect_err("non-owner cannot edit");

    assert!(matches!(err, WorkflowError::AccessDenied { .. }));
    assert_eq!(desk.ticket.title(), "Monitor flickers");
}

#[rstest]
fn author_removes_own_comment(mut desk: Desk) {
    let author = *desk.bystander.id();
    let comment = Comment::new(CommentId::random(), "Same here", author, at(3));
    let comment_id = comment.id();
    desk.ticket.add_comment(comment);

    let removed = remove_comment(&mut desk.ticket, &author, &comment_id).expect("author removes");
    assert!(removed.ticket_id().is_none());
    assert!(desk.ticket.comment(&comment_id).is_none());
}

#[rstest]
fn owner_cannot_remove_someone_elses_comment(mut desk: Desk) {
    let author = *desk.bystander.id();
    let comment = Comment::new(CommentId::random(), "Same here", author, at(3));
    let comment_id = comment.id();
    desk.ticket.add_comment(comment);

    let owner = *desk.owner.id();
    let err = remove_comment(&mut desk.ticket, &owner, &comment_id).expect_err("not the author");
    assert!(matches!(err, WorkflowError::CommentAccessDenied { .. }));
    assert!(desk.ticket.comment(&comment_id).is_some());
}

#[rstest]
fn removing_unknown_comment_reports_missing(mut desk: Desk) {
    let owner = *desk.owner.id();
    let missing = CommentId::random();
    assert_eq!(
        remove_comment(&mut desk.ticket, &owner, &missing).expect_err("missing"),
        WorkflowError::MissingComment { comment: missing }
    );
}
