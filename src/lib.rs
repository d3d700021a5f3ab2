pub mod api;
pub mod core;
pub mod shared;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::api::{router, AppState};
use crate::shared::settings::AppSettings;

/// Serve the HTTP API until ctrl-c.
pub async fn run(settings: AppSettings) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings).context("failed to initialise services")?;
    let app = router(state);

    let listener = TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "unitwise listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
