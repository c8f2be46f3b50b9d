//! Behavioural coverage for the in-memory repositories.

use super::*;
use crate::domain::{
    Comment, CommentId, DisplayName, NewTicket, PasswordHash, TicketPriority, link_assignee,
};
use crate::test_support::fixture_timestamp;
use chrono::Duration;
use rstest::{fixture, rstest};

struct Store {
    tickets: InMemoryTicketRepository,
    users: InMemoryUserRepository,
}

#[fixture]
fn store() -> Store {
    let shared = MemoryStore::shared();
    Store {
        tickets: InMemoryTicketRepository::new(Arc::clone(&shared)),
        users: InMemoryUserRepository::new(shared),
    }
}

fn user(email: &str) -> User {
    User::new(
        UserId::random(),
        Email::new(email).expect("valid email"),
        DisplayName::new("Someone").expect("valid name"),
        PasswordHash::derive("pw").expect("hash"),
    )
}

fn ticket(owner: &UserId, minutes: i64) -> Ticket {
    Ticket::open(
        TicketId::random(),
        NewTicket {
            title: format!("Ticket {minutes}"),
            description: "Details".into(),
            priority: TicketPriority::Normal,
            owner_id: *owner,
        },
        fixture_timestamp() + Duration::minutes(minutes),
    )
}

#[rstest]
#[tokio::test]
async fn saved_ticket_is_found_with_comments(store: Store) {
    let owner = UserId::random();
    let mut stored = ticket(&owner, 0);
    stored.add_comment(Comment::new(
        CommentId::random(),
        "First",
        owner,
        fixture_timestamp(),
    ));
    store.tickets.save(&stored).await.expect("save");

    let found = store
        .tickets
        .find_by_id(&stored.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found, stored);
    assert_eq!(found.comments().count(), 1);
}

#[rstest]
#[tokio::test]
async fn delete_reports_whether_a_row_was_removed(store: Store) {
    let stored = ticket(&UserId::random(), 0);
    store.tickets.save(&stored).await.expect("save");

    assert!(store.tickets.delete(&stored.id()).await.expect("delete"));
    assert!(!store.tickets.delete(&stored.id()).await.expect("delete"));
    assert!(
        store
            .tickets
            .find_by_id(&stored.id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn lists_are_filtered_and_ordered_by_creation(store: Store) {
    let owner = UserId::random();
    let later = ticket(&owner, 10);
    let earlier = ticket(&owner, 1);
    let foreign = ticket(&UserId::random(), 5);
    for t in [&later, &earlier, &foreign] {
        store.tickets.save(t).await.expect("save");
    }

    let owned = store.tickets.list_by_owner(&owner).await.expect("list");
    let ids: Vec<TicketId> = owned.iter().map(Ticket::id).collect();
    assert_eq!(ids, vec![earlier.id(), later.id()]);
}

#[rstest]
#[tokio::test]
async fn users_carry_ticket_sets_derived_from_tickets(store: Store) {
    let mut owner = user("owner@example.com");
    let mut agent = user("agent@example.com");
    store.users.upsert(&owner).await.expect("owner");
    store.users.upsert(&agent).await.expect("agent");

    let mut assigned = ticket(owner.id(), 0);
    link_assignee(&mut assigned, &mut agent, None, fixture_timestamp());
    store.tickets.save(&assigned).await.expect("save");
    owner = store
        .users
        .find_by_id(owner.id())
        .await
        .expect("lookup")
        .expect("present");
    agent = store
        .users
        .find_by_email(agent.email())
        .await
        .expect("lookup")
        .expect("present");

    assert!(owner.owned_tickets().contains(&assigned.id()));
    assert!(owner.assigned_tickets().is_empty());
    assert!(agent.assigned_tickets().contains(&assigned.id()));

    let by_assignee = store
        .tickets
        .list_by_assignee(agent.id())
        .await
        .expect("list");
    assert_eq!(by_assignee.len(), 1);
}

#[rstest]
#[tokio::test]
async fn upsert_rejects_duplicate_email(store: Store) {
    store
        .users
        .upsert(&user("dup@example.com"))
        .await
        .expect("first");

    let err = store
        .users
        .upsert(&user("dup@example.com"))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, UserPersistenceError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn upsert_replaces_existing_user(store: Store) {
    let mut stored = user("lin@example.com");
    store.users.upsert(&stored).await.expect("insert");
    stored.set_display_name(DisplayName::new("Lin").expect("valid name"));
    store.users.upsert(&stored).await.expect("update");

    let found = store
        .users
        .find_by_id(stored.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.display_name().as_str(), "Lin");
}
