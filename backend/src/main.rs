//! Bookshelf entry-point: loads settings, prepares storage, seeds the
//! operator's administrator and serves the pages.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookshelf::domain::{AdminBootstrap, AuthenticationService};
use bookshelf::inbound::http::health::HealthState;
use bookshelf::inbound::http::session_config::fingerprint::key_fingerprint;
use bookshelf::inbound::http::session_config::{BuildMode, session_settings_from_env};
use bookshelf::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use bookshelf::settings::AppSettings;
use mockable::DefaultEnv;
use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        idle_timeout_secs = session.idle_timeout.as_secs(),
        "session key loaded"
    );

    let mut config = ServerConfig::new(session, &settings);
    if let Some(url) = settings.database_url() {
        migrate(url.to_owned()).await?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let http_state = build_http_state(&config).map_err(std::io::Error::other)?;
    bootstrap_admin(&settings, &http_state.auth).await?;

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "listening");
    create_server(health_state, http_state, config)?.await
}

async fn migrate(url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)
}

async fn bootstrap_admin(
    settings: &AppSettings,
    auth: &AuthenticationService,
) -> std::io::Result<()> {
    let Some(seed) = settings.admin_seed().map_err(std::io::Error::other)? else {
        return Ok(());
    };
    match auth
        .bootstrap_admin(&seed.display_name, &seed.email, &seed.password)
        .await
    {
        Ok(AdminBootstrap::Created(user)) => {
            info!(user_id = %user.id(), "administrator created");
            Ok(())
        }
        Ok(AdminBootstrap::AlreadyPresent) => {
            info!("administrator already registered");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "administrator bootstrap failed");
            Err(std::io::Error::other(err.to_string()))
        }
    }
}
