//! Port for server-side sessions keyed by an opaque token.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{IdentitySnapshot, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The backing store could not be reached or is inconsistent.
        Unavailable { message: String } => "session store unavailable: {message}",
    }
}

/// Idle timeout applied when none is configured.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Owns every session from login until logout or idle expiry.
///
/// Each operation is atomic with respect to concurrent requests presenting
/// the same token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session holding `identity` and return its fresh token.
    async fn create(&self, identity: IdentitySnapshot) -> Result<SessionToken, SessionStoreError>;

    /// Resolve a live session and refresh its idle timer.
    ///
    /// Unknown and expired tokens both resolve to `None`; expired entries
    /// are removed.
    async fn find(&self, token: &SessionToken)
    -> Result<Option<IdentitySnapshot>, SessionStoreError>;

    /// End a session. Destroying an unknown token is not an error.
    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError>;
}
