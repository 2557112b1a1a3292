//! Port for one-way password hashing.
//!
//! Hashing is deliberately slow. Adapters must keep that work off the async
//! executor so one computation cannot stall unrelated requests.

use async_trait::async_trait;

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    ///
    /// Only resource exhaustion or a lost worker produces an error; input
    /// content never does.
    pub enum PasswordHashError {
        /// The hashing worker could not run or complete.
        Worker { message: String } => "password hashing worker failed: {message}",
    }
}

/// Salted, computationally expensive password digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a fresh salted digest. Hashing the same input twice yields
    /// different digests.
    async fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError>;

    /// Check `plaintext` against `digest` using a constant-time comparison.
    ///
    /// A digest that cannot be parsed verifies as `false`.
    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError>;
}
