//! # Passkey Ceremony Server
//!
//! Entry point: loads configuration, opens the store, and serves the
//! challenge, registration and login endpoints.

use passkey_ceremony_server::config::Config;
use passkey_ceremony_server::db::challenges::cleanup_expired_challenges;
use passkey_ceremony_server::routes;
use passkey_ceremony_server::state::AppState;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main application entry point
///
/// 1. Sets up logging (override with RUST_LOG)
/// 2. Loads configuration from the environment
/// 3. Opens the store and runs migrations
/// 4. Starts a background task that deletes expired challenges
/// 5. Serves the router
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_ceremony_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!(
        rp_id = %app_state.relying_party.rp_id,
        partition = %app_state.store.partition(),
        "Application state initialized"
    );

    // Redeemed challenges are deleted on use; this sweeps the abandoned ones
    let cleanup_store = app_state.store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            match cleanup_expired_challenges(&cleanup_store).await {
                Ok(removed) => tracing::debug!(removed, "Challenge cleanup finished"),
                Err(e) => tracing::error!("Challenge cleanup failed: {:?}", e),
            }
        }
    });

    let session_store = SqliteStore::new(app_state.store.pool().clone());
    session_store.migrate().await?;

    let app = routes::router(app_state, session_store, &config.static_dir);

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
