//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub(crate) use metrics::make_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

use ticket_desk::Trace;
use ticket_desk::domain::User;
#[cfg(debug_assertions)]
use ticket_desk::doc::ApiDoc;
use ticket_desk::inbound::http::configure_api;
use ticket_desk::inbound::http::health::{HealthState, live, ready};
use ticket_desk::inbound::http::state::HttpState;
use ticket_desk::outbound::memory::{InMemoryTicketRepository, InMemoryUserRepository, MemoryStore};
use ticket_desk::outbound::persistence::{DbPool, DieselTicketRepository, DieselUserRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store holding only `seed_user`.
fn build_http_state(db_pool: Option<&DbPool>, seed_user: Option<&User>) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let Some(pool) = db_pool else {
        warn!("no database configured; tickets are kept in memory and lost on restart");
        let store = MemoryStore::shared();
        match seed_user {
            Some(user) => {
                store.put_user(user).map_err(io::Error::other)?;
                info!(user_id = %user.id(), "seeded in-memory user");
            }
            None => warn!("no seed user configured; nobody can log in to the in-memory store"),
        }
        return Ok(HttpState::from_repositories(
            Arc::new(InMemoryTicketRepository::new(Arc::clone(&store))),
            Arc::new(InMemoryUserRepository::new(store)),
            clock,
        ));
    };

    info!("serving tickets from PostgreSQL");
    if seed_user.is_some() {
        warn!("seed user ignored with a database; use create-user instead");
    }
    Ok(HttpState::from_repositories(
        Arc::new(DieselTicketRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        clock,
    ))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(
        config.db_pool.as_ref(),
        config.seed_user.as_ref(),
    )?);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        seed_user: _,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
