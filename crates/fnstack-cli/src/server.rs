//! Server startup and lifecycle

use crate::{routes, AppState, GatewayConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Build application state and run startup tasks
async fn prepare(config: GatewayConfig) -> anyhow::Result<Arc<AppState>> {
    let state = AppState::new(config)?;

    if state.config.ensure_bucket_on_start {
        state.gateway.ensure_bucket(state.gateway.bucket()).await?;
        info!(bucket = %state.gateway.bucket(), "Bucket ready");
    }

    Ok(Arc::new(state))
}

/// Run the file service
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    let state = prepare(config).await?;
    let addr = state.config.bind_addr();
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&addr).await?;

    info!("File service listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = prepare(config).await?;
    let addr = state.config.bind_addr();
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&addr).await?;

    info!("File service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("File service shutdown complete");

    Ok(())
}
