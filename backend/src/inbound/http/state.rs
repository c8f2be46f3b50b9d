//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    IdentityQuery, LoginService, TicketCommand, TicketQuery, TicketRepository, UserRepository,
};
use crate::domain::validation::ConstraintTicketValidator;
use crate::domain::{
    CredentialLoginService, IdentityService, TicketCommandService, TicketQueryService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tickets: Arc<dyn TicketCommand>,
    pub ticket_query: Arc<dyn TicketQuery>,
    pub identity: Arc<dyn IdentityQuery>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Wire the domain services over a pair of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use ticket_desk::inbound::http::state::HttpState;
    /// use ticket_desk::outbound::memory::{
    ///     InMemoryTicketRepository, InMemoryUserRepository, MemoryStore,
    /// };
    ///
    /// let store = MemoryStore::shared();
    /// let state = HttpState::from_repositories(
    ///     Arc::new(InMemoryTicketRepository::new(store.clone())),
    ///     Arc::new(InMemoryUserRepository::new(store)),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn from_repositories<T, U>(tickets: Arc<T>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self
    where
        T: TicketRepository + 'static,
        U: UserRepository + 'static,
    {
        Self {
            tickets: Arc::new(TicketCommandService::new(
                Arc::clone(&tickets),
                Arc::clone(&users),
                Arc::new(ConstraintTicketValidator),
                clock,
            )),
            ticket_query: Arc::new(TicketQueryService::new(tickets)),
            identity: Arc::new(IdentityService::new(Arc::clone(&users))),
            login: Arc::new(CredentialLoginService::new(users)),
        }
    }
}
