//! Bookshelf: a book catalogue with session-based accounts.
//!
//! - [`domain`]: accounts, sessions, flash messages, the authentication
//!   service and the authorization gates, free of framework types.
//! - [`inbound::http`]: actix handlers, extractors and the page view model.
//! - [`outbound`]: bcrypt hashing, in-memory stores and the PostgreSQL
//!   credential store.
//! - [`settings`]: OrthoConfig application settings.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[doc(hidden)]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
