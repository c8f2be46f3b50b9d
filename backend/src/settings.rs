//! Server settings loaded via OrthoConfig.
//!
//! Values come from `--flags`, `TICKET_DESK_*` environment variables or a
//! configuration file, in that order of precedence. Session cookie settings
//! are read separately by [`crate::inbound::http::session_config`].

use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DisplayName, Email, PasswordHash, Role, User, UserId, UserValidationError};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SEED_NAME: &str = "Administrator";

/// Bind address and storage settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TICKET_DESK")]
pub struct AppSettings {
    /// Interface to bind; defaults to all IPv4 interfaces.
    pub host: Option<String>,
    /// Port to bind; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL connection URL. Without one the server runs in memory.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Email of an administrator created at startup when running in memory.
    pub seed_email: Option<String>,
    /// Display name for the seeded administrator.
    pub seed_name: Option<String>,
    /// Password for the seeded administrator.
    pub seed_password: Option<String>,
}

impl AppSettings {
    /// Socket address assembled from `host` and `port`.
    ///
    /// # Errors
    /// Returns [`AddrParseError`] when `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip = match self.host.as_deref() {
            Some(host) => host.trim().parse::<IpAddr>()?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Administrator described by the `seed_*` settings, if an email is set.
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when the email or name is invalid or
    /// the password is missing.
    pub fn seed_user(&self) -> Result<Option<User>, UserValidationError> {
        let Some(email) = non_blank(self.seed_email.as_deref()) else {
            return Ok(None);
        };
        let name = non_blank(self.seed_name.as_deref()).unwrap_or(DEFAULT_SEED_NAME);
        let password = self.seed_password.as_deref().unwrap_or_default();

        let mut user = User::new(
            UserId::random(),
            Email::new(email)?,
            DisplayName::new(name)?,
            PasswordHash::derive(password)?,
        );
        user.grant(Role::Admin);
        Ok(Some(user))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
