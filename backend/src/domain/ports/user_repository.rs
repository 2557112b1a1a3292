//! Port abstraction for the credential store and its errors.
use async_trait::async_trait;

use crate::domain::{Email, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Another account already uses the normalised email.
        DuplicateEmail => "email already registered",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Durable record of accounts keyed by normalised email.
///
/// There is no update or delete: users are immutable once created.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, assigning its id and creation time.
    ///
    /// The uniqueness check and the insert are a single atomic step. When
    /// two callers race on the same email exactly one succeeds and the other
    /// receives [`UserPersistenceError::DuplicateEmail`].
    async fn create(&self, new_user: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}
