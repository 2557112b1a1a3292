//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL credential store using Diesel ORM
//! - **memory**: in-process credential, session and book stores
//! - **bcrypt_hasher**: password hashing on the blocking pool
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod bcrypt_hasher;
pub mod memory;
pub mod persistence;
