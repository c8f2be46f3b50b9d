//! Backend entry-point: loads settings, prepares storage and serves the
//! ticket API with its OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "metrics")]
use server::make_metrics;
use server::{ServerConfig, create_server};
use ticket_desk::inbound::http::health::HealthState;
use ticket_desk::inbound::http::session_config::{BuildMode, session_settings_from_env};
use ticket_desk::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use ticket_desk::settings::AppSettings;

/// Apply migrations on a blocking thread and open the connection pool.
async fn prepare_database(database_url: &str, max_size: u32) -> io::Result<DbPool> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|err| io::Error::other(format!("migration task failed: {err}")))?
        .map_err(io::Error::other)?;

    DbPool::new(PoolConfig::new(database_url).with_max_size(max_size))
        .await
        .map_err(|err| io::Error::other(format!("create database pool: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("load settings: {err}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io::Error::other(format!("invalid bind host: {err}")))?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    let seed_user = settings
        .seed_user()
        .map_err(|err| io::Error::other(format!("invalid seed user: {err}")))?;
    config = config.with_seed_user(seed_user);
    if let Some(database_url) = settings.database_url() {
        let pool = prepare_database(database_url, settings.pool_max_size()).await?;
        info!("database ready");
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
