//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from the command line, a configuration file or a
//! `BOOKSHELF_*` environment variable. Cookie session toggles are read
//! separately by [`crate::inbound::http::session_config`].

use std::fmt;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::PasswordPolicy;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Server and authentication settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKSHELF")]
pub struct AppSettings {
    /// Shortest password accepted at registration.
    #[ortho_config(default = 6)]
    pub min_password_length: usize,
    /// bcrypt work factor for new digests.
    #[ortho_config(default = 10)]
    pub bcrypt_cost: u32,
    /// Address the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; without it accounts live in memory.
    pub database_url: Option<String>,
    /// Email of the administrator created at start-up, if any.
    pub admin_email: Option<String>,
    /// Password of the administrator created at start-up.
    pub admin_password: Option<String>,
    /// Display name of the administrator created at start-up.
    pub admin_display_name: Option<String>,
}

/// Operator-supplied administrator account.
pub struct AdminSeed {
    pub display_name: String,
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Raised when only half of the administrator credentials are configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("BOOKSHELF_ADMIN_EMAIL and BOOKSHELF_ADMIN_PASSWORD must be set together")]
pub struct IncompleteAdminSeed;

impl AppSettings {
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.min_password_length)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// The administrator to bootstrap, if one is configured.
    ///
    /// # Errors
    /// [`IncompleteAdminSeed`] when exactly one of email and password is set.
    pub fn admin_seed(&self) -> Result<Option<AdminSeed>, IncompleteAdminSeed> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Ok(Some(AdminSeed {
                display_name: self
                    .admin_display_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADMIN_DISPLAY_NAME.to_owned()),
                email: email.clone(),
                password: Zeroizing::new(password.clone()),
            })),
            (None, None) => Ok(None),
            _ => Err(IncompleteAdminSeed),
        }
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("min_password_length", &self.min_password_length)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("admin_display_name", &self.admin_display_name)
            .finish()
    }
}
