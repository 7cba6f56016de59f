//! # Taskboard API Server
//!
//! Serves the Taskboard HTTP API over the configured backend.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) TASKBOARD_BACKEND=memory cargo run -p taskboard-api
//! ```

use std::sync::Arc;

use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::config::BackendKind;
use taskboard_shared::mailer::LogMailer;
use taskboard_shared::remote::{AppwriteConnector, Connector, MemoryBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let connector: Arc<dyn Connector> = match config.backend.kind {
        BackendKind::Appwrite => Arc::new(AppwriteConnector::new(config.backend.clone())),
        BackendKind::Memory => {
            tracing::warn!("Using the in-memory backend; data is lost on restart");
            Arc::new(MemoryBackend::new())
        }
    };

    let bind_address = config.bind_address();
    tracing::info!(backend = %config.backend.kind, endpoint = %config.backend.endpoint, "Backend configured");

    let state = AppState::new(connector, Arc::new(LogMailer), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
