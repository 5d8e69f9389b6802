//! Stream relay entry-point: loads settings, prepares the lifecycle store and
//! serves the HTTP API.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use stream_relay::inbound::http::health::HealthState;
use stream_relay::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use stream_relay::server::{ServerConfig, create_server};
use stream_relay::settings::RelaySettings;

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

    let settings = RelaySettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut config = ServerConfig::new(
        bind_addr,
        settings.ingest_endpoint(),
        settings.media_server(),
        settings.request_timeout(),
    );

    match settings.database_url() {
        Some(database_url) => {
            run_pending_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(settings.db_pool_size()),
            )
            .await
            .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("no database URL configured; lifecycle state is kept in memory");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting stream relay");
    create_server(health_state, config)?.await
}
