//! Builders for the handler state from server configuration.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use bookshelf::domain::AuthenticationService;
use bookshelf::domain::ports::UserRepository;
use bookshelf::inbound::http::state::HttpState;
use bookshelf::outbound::bcrypt_hasher::{BcryptHasher, InvalidBcryptCost};
use bookshelf::outbound::memory::{
    InMemoryBookRepository, InMemorySessionStore, InMemoryUserRepository,
};
use bookshelf::outbound::persistence::DieselUserRepository;
use tracing::{info, warn};

use super::ServerConfig;

fn build_user_repository(config: &ServerConfig) -> Arc<dyn UserRepository> {
    match &config.db_pool {
        Some(pool) => {
            info!("credential store: postgres");
            Arc::new(DieselUserRepository::new(pool.clone()))
        }
        None => {
            warn!("credential store: in memory; accounts are lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    }
}

/// Build the shared handler state.
///
/// # Errors
/// Returns [`InvalidBcryptCost`] when the configured cost is out of range.
pub fn build_http_state(config: &ServerConfig) -> Result<web::Data<HttpState>, InvalidBcryptCost> {
    let hasher = BcryptHasher::new(config.bcrypt_cost)?;
    let sessions = InMemorySessionStore::new(Arc::new(DefaultClock), config.idle_timeout);
    let auth = AuthenticationService::new(
        build_user_repository(config),
        Arc::new(hasher),
        Arc::new(sessions),
        config.password_policy,
    );
    Ok(web::Data::new(HttpState::new(
        auth,
        Arc::new(InMemoryBookRepository::new()),
    )))
}
