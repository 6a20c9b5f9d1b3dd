use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use faith_guidance::GuidanceService;
use faith_guidance::config::Config;
use faith_guidance::handlers::{self, AppState};
use faith_guidance::redis::RedisManager;
use faith_guidance::repository::{
    RedisHistoryRepository, RedisProfileRepository, RedisSessionVerifier,
};
use faith_guidance::repository_traits::{HistoryRepository, ProfileRepository, SessionVerifier};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Arc::new(Config::load());

    let redis_manager = Arc::new(RedisManager::new_with_config(&config).await?);
    let repository: Arc<dyn HistoryRepository> =
        Arc::new(RedisHistoryRepository::new(redis_manager.clone()));
    let profiles: Arc<dyn ProfileRepository> =
        Arc::new(RedisProfileRepository::new(redis_manager.clone()));
    let sessions: Arc<dyn SessionVerifier> =
        Arc::new(RedisSessionVerifier::new(redis_manager.clone()));

    let service = Arc::new(GuidanceService::from_config(&config, repository.clone())?);
    let state = AppState::new(service, repository, profiles, sessions, config.clone());

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}' (expected host:port)", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        name = %config.server.name,
        version = %config.server.version,
        "Starting guidance HTTP server"
    );

    axum::serve(listener, handlers::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
