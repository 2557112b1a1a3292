//! In-process adapters.
//!
//! Used when no database is configured and throughout the test suites. Each
//! store guards its map with a single tokio lock, so every port operation is
//! atomic with respect to concurrent requests.

mod book_repository;
mod session_store;
mod user_repository;

pub use book_repository::InMemoryBookRepository;
pub use session_store::{DEFAULT_IDLE_TIMEOUT, InMemorySessionStore};
pub use user_repository::InMemoryUserRepository;
