//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the authentication service and domain ports, and remain
//! testable without I/O.

use std::sync::Arc;

use crate::domain::AuthenticationService;
use crate::domain::ports::BookRepository;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthenticationService,
    pub books: Arc<dyn BookRepository>,
}

impl HttpState {
    /// Construct state from the service and catalogue port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use bookshelf::domain::{AuthenticationService, PasswordPolicy};
    /// use bookshelf::inbound::http::state::HttpState;
    /// use bookshelf::outbound::bcrypt_hasher::BcryptHasher;
    /// use bookshelf::outbound::memory::{
    ///     DEFAULT_IDLE_TIMEOUT, InMemoryBookRepository, InMemorySessionStore,
    ///     InMemoryUserRepository,
    /// };
    ///
    /// let auth = AuthenticationService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(BcryptHasher::default()),
    ///     Arc::new(InMemorySessionStore::new(
    ///         Arc::new(mockable::DefaultClock),
    ///         DEFAULT_IDLE_TIMEOUT,
    ///     )),
    ///     PasswordPolicy::default(),
    /// );
    /// let state = HttpState::new(auth, Arc::new(InMemoryBookRepository::new()));
    /// assert_eq!(state.auth.policy(), PasswordPolicy::default());
    /// ```
    pub fn new(auth: AuthenticationService, books: Arc<dyn BookRepository>) -> Self {
        Self { auth, books }
    }
}
