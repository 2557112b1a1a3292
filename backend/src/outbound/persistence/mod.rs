//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Only the credential store is durable. Repository implementations
//! translate between Diesel rows and domain types and map every database
//! failure to the port's error enum; row structs and the schema stay
//! private to this module.
//!
//! # Example
//!
//! ```ignore
//! use bookshelf::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookshelf")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
