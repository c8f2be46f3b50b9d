//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Loaded users carry their owned and assigned ticket ids, read from the
//! `tickets` table on every lookup.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Email, PasswordHash, Role, TicketId, User, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{tickets, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn invalid_row(field: &str, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user has invalid {field}: {err}"))
}

fn row_to_user(
    row: UserRow,
    owned: Vec<Uuid>,
    assigned: Vec<Uuid>,
) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        display_name,
        password_hash,
        roles,
    } = row;

    let email = Email::new(email).map_err(|err| invalid_row("email", err))?;
    let display_name =
        DisplayName::new(display_name).map_err(|err| invalid_row("display name", err))?;
    let password =
        PasswordHash::from_stored(password_hash).map_err(|err| invalid_row("password", err))?;
    let roles = roles
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid_row("role", err))?;

    Ok(
        User::new(UserId::from_uuid(id), email, display_name, password)
            .with_roles(roles)
            .with_ticket_sets(
                owned.into_iter().map(TicketId::from_uuid),
                assigned.into_iter().map(TicketId::from_uuid),
            ),
    )
}

fn role_names(user: &User) -> Vec<String> {
    user.granted_roles()
        .iter()
        .map(|role| role.as_str().to_owned())
        .collect()
}

async fn with_ticket_sets(
    conn: &mut AsyncPgConnection,
    row: UserRow,
) -> Result<User, UserPersistenceError> {
    let owned: Vec<Uuid> = tickets::table
        .filter(tickets::owner_id.eq(row.id))
        .select(tickets::id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let assigned: Vec<Uuid> = tickets::table
        .filter(tickets::assignee_id.eq(row.id))
        .select(tickets::id)
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    row_to_user(row, owned, assigned)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_str(),
            display_name: user.display_name().as_str(),
            password_hash: user.password().as_str(),
            roles: role_names(user),
        };
        let update_row = UserUpdate {
            email: new_row.email,
            display_name: new_row.display_name,
            password_hash: new_row.password_hash,
            roles: new_row.roles.clone(),
            updated_at: Utc::now(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::id)
            .do_update()
            .set(&update_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => with_ticket_sets(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => with_ticket_sets(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }
}
