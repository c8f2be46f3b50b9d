//! In-memory adapters for the ticket and user repository ports.
//!
//! Both repositories share one [`MemoryStore`] so users can derive their
//! owned and assigned ticket sets from the stored tickets, mirroring the
//! PostgreSQL adapters. Used when no database is configured and by the HTTP
//! integration tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    TicketRepository, TicketRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Email, Ticket, TicketId, User, UserId};

/// Shared backing maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tickets: Mutex<BTreeMap<TicketId, Ticket>>,
    users: Mutex<BTreeMap<UserId, User>>,
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tickets(&self) -> Result<MutexGuard<'_, BTreeMap<TicketId, Ticket>>, String> {
        self.tickets
            .lock()
            .map_err(|_| "ticket store lock poisoned".to_owned())
    }

    fn users(&self) -> Result<MutexGuard<'_, BTreeMap<UserId, User>>, String> {
        self.users
            .lock()
            .map_err(|_| "user store lock poisoned".to_owned())
    }

    /// Insert or replace `user`, keeping emails unique. Also used to seed a
    /// fresh store before the server starts.
    pub fn put_user(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users().map_err(UserPersistenceError::query)?;
        let email_taken = users
            .values()
            .any(|other| other.email() == user.email() && other.id() != user.id());
        if email_taken {
            return Err(UserPersistenceError::query("unique constraint violated"));
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }
}

fn sorted(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets.sort_by_key(|ticket| (ticket.created_at(), ticket.id()));
    tickets
}

/// Ticket repository over the shared store.
#[derive(Debug, Clone)]
pub struct InMemoryTicketRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryTicketRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn select<F>(&self, keep: F) -> Result<Vec<Ticket>, TicketRepositoryError>
    where
        F: Fn(&Ticket) -> bool,
    {
        let tickets = self.store.tickets().map_err(TicketRepositoryError::query)?;
        Ok(sorted(
            tickets.values().filter(|t| keep(t)).cloned().collect(),
        ))
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError> {
        let tickets = self.store.tickets().map_err(TicketRepositoryError::query)?;
        Ok(tickets.get(id).cloned())
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut tickets = self.store.tickets().map_err(TicketRepositoryError::query)?;
        tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, TicketRepositoryError> {
        let mut tickets = self.store.tickets().map_err(TicketRepositoryError::query)?;
        Ok(tickets.remove(id).is_some())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Ticket>, TicketRepositoryError> {
        self.select(|ticket| ticket.owner_id() == owner)
    }

    async fn list_by_assignee(
        &self,
        assignee: &UserId,
    ) -> Result<Vec<Ticket>, TicketRepositoryError> {
        self.select(|ticket| ticket.assignee_id() == Some(assignee))
    }
}

/// User repository over the shared store.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn with_ticket_sets(&self, user: User) -> Result<User, UserPersistenceError> {
        let tickets = self.store.tickets().map_err(UserPersistenceError::query)?;
        let owned: Vec<TicketId> = tickets
            .values()
            .filter(|ticket| ticket.owner_id() == user.id())
            .map(Ticket::id)
            .collect();
        let assigned: Vec<TicketId> = tickets
            .values()
            .filter(|ticket| ticket.assignee_id() == Some(user.id()))
            .map(Ticket::id)
            .collect();
        drop(tickets);
        Ok(user.with_ticket_sets(owned, assigned))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.store.put_user(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let found = {
            let users = self.store.users().map_err(UserPersistenceError::query)?;
            users.get(id).cloned()
        };
        found.map(|user| self.with_ticket_sets(user)).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let found = {
            let users = self.store.users().map_err(UserPersistenceError::query)?;
            users.values().find(|user| user.email() == email).cloned()
        };
        found.map(|user| self.with_ticket_sets(user)).transpose()
    }
}

#[cfg(test)]
mod tests;
