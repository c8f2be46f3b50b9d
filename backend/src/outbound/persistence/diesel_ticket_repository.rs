//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! A ticket and its comments are written in one transaction. Comments that
//! are stored against the ticket but no longer part of the aggregate have
//! their `ticket_id` cleared rather than being deleted.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{
    Comment, CommentId, Ticket, TicketId, TicketPriority, TicketRecord, TicketStatus, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CommentRow, NewCommentRow, NewTicketRow, TicketRow, TicketUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, tickets};

/// Diesel-backed implementation of the ticket repository port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketRepositoryError {
    map_basic_pool_error(error, TicketRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TicketRepositoryError {
    map_basic_diesel_error(
        error,
        TicketRepositoryError::query,
        TicketRepositoryError::connection,
    )
}

fn row_to_comment(row: CommentRow) -> Comment {
    let CommentRow {
        id,
        content,
        created_at,
        author_id,
        ticket_id,
    } = row;
    Comment::restore(
        CommentId::from_uuid(id),
        content,
        UserId::from_uuid(author_id),
        created_at,
        ticket_id.map(TicketId::from_uuid),
    )
}

/// Convert a stored row and its comments back into an aggregate, re-checking
/// the enum columns and assignment invariants.
fn row_to_ticket(
    row: TicketRow,
    comments: Vec<CommentRow>,
) -> Result<Ticket, TicketRepositoryError> {
    let TicketRow {
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
    } = row;

    let priority = priority
        .parse::<TicketPriority>()
        .map_err(|err| TicketRepositoryError::query(err.to_string()))?;
    let status = status
        .parse::<TicketStatus>()
        .map_err(|err| TicketRepositoryError::query(err.to_string()))?;

    Ticket::restore(TicketRecord {
        id: TicketId::from_uuid(id),
        title,
        description,
        priority,
        status,
        created_at,
        owner_id: UserId::from_uuid(owner_id),
        assignee_id: assignee_id.map(UserId::from_uuid),
        assigned_at_first,
        assigned_at_last,
        comments: comments.into_iter().map(row_to_comment).collect(),
    })
    .map_err(|err| TicketRepositoryError::query(format!("ticket {id}: {err}")))
}

async fn load_comments(
    conn: &mut AsyncPgConnection,
    ticket_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<CommentRow>>, diesel::result::Error> {
    let rows: Vec<CommentRow> = comments::table
        .filter(comments::ticket_id.eq_any(ticket_ids))
        .order((comments::created_at.asc(), comments::id.asc()))
        .select(CommentRow::as_select())
        .load(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<CommentRow>> = HashMap::new();
    for row in rows {
        if let Some(ticket_id) = row.ticket_id {
            grouped.entry(ticket_id).or_default().push(row);
        }
    }
    Ok(grouped)
}

async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<TicketRow>,
) -> Result<Vec<Ticket>, TicketRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut grouped = load_comments(conn, &ids).await.map_err(map_diesel_error)?;
    rows.into_iter()
        .map(|row| {
            let comments = grouped.remove(&row.id).unwrap_or_default();
            row_to_ticket(row, comments)
        })
        .collect()
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = tickets::table
            .filter(tickets::id.eq(id.as_uuid()))
            .select(TicketRow::as_select())
            .first::<TicketRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ticket_id = *ticket.id().as_uuid();

        let new_row = NewTicketRow {
            id: ticket_id,
            title: ticket.title(),
            description: ticket.description(),
            priority: ticket.priority().as_str(),
            status: ticket.status().as_str(),
            created_at: ticket.created_at(),
            owner_id: *ticket.owner_id().as_uuid(),
            assignee_id: ticket.assignee_id().map(|id| *id.as_uuid()),
            assigned_at_first: ticket.assigned_at_first(),
            assigned_at_last: ticket.assigned_at_last(),
        };
        let update_row = TicketUpdate {
            title: new_row.title,
            description: new_row.description,
            priority: new_row.priority,
            status: new_row.status,
            owner_id: new_row.owner_id,
            assignee_id: new_row.assignee_id,
            assigned_at_first: new_row.assigned_at_first,
            assigned_at_last: new_row.assigned_at_last,
        };
        let comment_rows: Vec<NewCommentRow<'_>> = ticket
            .comments()
            .map(|comment| NewCommentRow {
                id: *comment.id().as_uuid(),
                content: comment.content(),
                created_at: comment.created_at(),
                author_id: *comment.author_id().as_uuid(),
                ticket_id: Some(ticket_id),
            })
            .collect();
        let kept_ids: Vec<Uuid> = comment_rows.iter().map(|row| row.id).collect();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(tickets::table)
                    .values(&new_row)
                    .on_conflict(tickets::id)
                    .do_update()
                    .set(&update_row)
                    .execute(conn)
                    .await?;

                diesel::update(
                    comments::table.filter(
                        comments::ticket_id
                            .eq(ticket_id)
                            .and(comments::id.ne_all(&kept_ids)),
                    ),
                )
                .set(comments::ticket_id.eq(None::<Uuid>))
                .execute(conn)
                .await?;

                if !comment_rows.is_empty() {
                    diesel::insert_into(comments::table)
                        .values(&comment_rows)
                        .on_conflict(comments::id)
                        .do_update()
                        .set((
                            comments::content.eq(excluded(comments::content)),
                            comments::ticket_id.eq(excluded(comments::ticket_id)),
                        ))
                        .execute(conn)
                        .await?;
                }

                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // comments.ticket_id is ON DELETE SET NULL, so attached comments are
        // detached rather than removed.
        let removed = diesel::delete(tickets::table.filter(tickets::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::owner_id.eq(owner.as_uuid()))
            .order((tickets::created_at.asc(), tickets::id.asc()))
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        hydrate(&mut conn, rows).await
    }

    async fn list_by_assignee(
        &self,
        assignee: &UserId,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::assignee_id.eq(assignee.as_uuid()))
            .order((tickets::created_at.asc(), tickets::id.asc()))
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        hydrate(&mut conn, rows).await
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; SQL round trips need a live database.
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> TicketRow {
        TicketRow {
            id: Uuid::new_v4(),
            title: "Heating".into(),
            description: "Radiator cold".into(),
            priority: "high".into(),
            status: "waiting".into(),
            created_at: Utc::now(),
            owner_id: Uuid::new_v4(),
            assignee_id: Some(Uuid::new_v4()),
            assigned_at_first: Some(Utc::now()),
            assigned_at_last: Some(Utc::now() + Duration::minutes(1)),
        }
    }

    #[rstest]
    fn converts_row_with_comments(row: TicketRow) {
        let ticket_id = row.id;
        let comment = CommentRow {
            id: Uuid::new_v4(),
            content: "Bleed it".into(),
            created_at: Utc::now(),
            author_id: Uuid::new_v4(),
            ticket_id: Some(ticket_id),
        };

        let ticket = row_to_ticket(row, vec![comment]).expect("valid row");
        assert_eq!(ticket.priority(), TicketPriority::High);
        assert_eq!(ticket.status(), TicketStatus::Waiting);
        assert_eq!(ticket.comments().count(), 1);
    }

    #[rstest]
    fn rejects_unknown_status(mut row: TicketRow) {
        row.status = "archived".into();
        let err = row_to_ticket(row, Vec::new()).expect_err("unknown status");
        assert!(matches!(err, TicketRepositoryError::Query { .. }));
    }

    #[rstest]
    fn rejects_inconsistent_assignment_columns(mut row: TicketRow) {
        row.assigned_at_first = None;
        let err = row_to_ticket(row, Vec::new()).expect_err("missing first assignment");
        assert!(err.to_string().contains("inconsistent assignment"));
    }
}
