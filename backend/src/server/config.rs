//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use bookshelf::domain::PasswordPolicy;
use bookshelf::inbound::http::session_config::SessionSettings;
use bookshelf::outbound::persistence::DbPool;
use bookshelf::settings::AppSettings;

/// Everything needed to build the application state and bind the server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) idle_timeout: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) password_policy: PasswordPolicy,
    pub(crate) bcrypt_cost: u32,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Combine cookie session settings with application settings.
    #[must_use]
    pub fn new(session: SessionSettings, settings: &AppSettings) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            idle_timeout,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            idle_timeout,
            bind_addr: settings.bind_addr(),
            password_policy: settings.password_policy(),
            bcrypt_cost: settings.bcrypt_cost(),
            db_pool: None,
        }
    }

    /// Keep accounts in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
