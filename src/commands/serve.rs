//! Serve command - runs the reference backend.

use std::sync::Arc;
use std::time::Duration;

use tower_sessions::session_store::ExpiredDeletion;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, SESSION_SWEEP_INTERVAL_SECS};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, DbSessionStore};

pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    let database = Arc::new(Database::connect(&config).await?);

    let sessions = DbSessionStore::new(database.get_connection());
    tokio::spawn(sweep_sessions(sessions.clone()));

    let host = args.host.unwrap_or_else(|| config.server_host.clone());
    let port = args.port.unwrap_or(config.server_port);
    let app = create_router(AppState::from_config(database, config)?, sessions);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("The server is running on {} port", port);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Remove expired session rows for as long as the server runs.
async fn sweep_sessions(store: DbSessionStore) {
    let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
    loop {
        interval.tick().await;
        if let Err(e) = store.delete_expired().await {
            tracing::warn!(error = %e, "Expired session sweep failed");
        }
    }
}
