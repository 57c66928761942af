//! tokengate gateway binary.
//!
//! - Loads `TOKENGATE_CONFIG` (default `tokengate.yaml`)
//! - Loads the token list and starts its directory watch
//! - Serves ops endpoints and token-checked `/v1` routes
//! - Graceful shutdown on Ctrl+C / SIGTERM

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use tokengate_core::error::{Result, TokenGateError};
use tokengate_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "tokengate-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| TokenGateError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}")))?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(cfg, shutdown.clone())?;
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        tokens = state.store().current_snapshot().len(),
        watching = state.store().is_watching(),
        "tokengate-gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TokenGateError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| TokenGateError::Internal(format!("server failed: {e}")))?;

    shutdown.cancel();
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
    state.begin_drain();
}
