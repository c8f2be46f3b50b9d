//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::ports::UserRepository;
use crate::domain::{DisplayName, Email, PasswordHash, User, UserId};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryTicketRepository, InMemoryUserRepository, MemoryStore};
use crate::test_support::MutableClock;

/// Session middleware with a fresh key, cookie name `session` and the
/// `Secure` flag disabled for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    test_session_middleware_with_key(Key::generate())
}

/// As [`test_session_middleware`], signing cookies with `key` so they stay
/// valid across separately built apps.
pub fn test_session_middleware_with_key(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// In-memory adapters plus the HTTP state wired over them.
pub struct MemoryDesk {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub tickets: Arc<InMemoryTicketRepository>,
    pub clock: Arc<MutableClock>,
}

impl MemoryDesk {
    pub fn new() -> Self {
        let store = MemoryStore::shared();
        let users = Arc::new(InMemoryUserRepository::new(Arc::clone(&store)));
        let tickets = Arc::new(InMemoryTicketRepository::new(store));
        let clock = Arc::new(MutableClock::default());
        let state =
            HttpState::from_repositories(Arc::clone(&tickets), Arc::clone(&users), clock.clone());
        Self {
            state,
            users,
            tickets,
            clock,
        }
    }

    /// Store a user whose password is `password`.
    ///
    /// # Panics
    /// Panics when the fixture values are invalid or the store rejects them.
    pub async fn seed_user(&self, email: &str, name: &str, password: &str) -> User {
        let user = User::new(
            UserId::random(),
            Email::new(email).expect("fixture email"),
            DisplayName::new(name).expect("fixture display name"),
            PasswordHash::derive(password).expect("fixture password"),
        );
        self.users.upsert(&user).await.expect("seed user");
        user
    }
}

impl Default for MemoryDesk {
    fn default() -> Self {
        Self::new()
    }
}

/// The API scope with session middleware and the given state.
pub fn api_app(
    state: HttpState,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    api_app_with_key(state, Key::generate())
}

/// [`api_app`] with a caller-chosen session key.
pub fn api_app_with_key(
    state: HttpState,
    key: Key,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    actix_web::App::new()
        .app_data(actix_web::web::Data::new(state))
        .wrap(crate::Trace)
        .service(
            actix_web::web::scope("/api/v1")
                .wrap(test_session_middleware_with_key(key))
                .configure(crate::inbound::http::configure_api),
        )
}

/// The `session` cookie set by a response.
///
/// # Panics
/// Panics when the response did not set the cookie.
pub fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
