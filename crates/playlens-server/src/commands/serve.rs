use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use playlens_enrich::{Config, PlaylistPipeline};
use playlens_server::{build_router, AppState};

/// Build the pipeline from `config` and serve the HTTP API until shutdown.
pub async fn run_serve(config: Config) -> Result<()> {
    info!("Starting playlens v{}", env!("CARGO_PKG_VERSION"));

    if config.spotify_client_id.is_none() || config.spotify_client_secret.is_none() {
        warn!("Spotify credentials are not configured; playlist requests will fail");
        warn!("Run 'playlens config init' and edit the generated file");
    }

    let pipeline =
        PlaylistPipeline::from_config(&config).context("Failed to build enrichment pipeline")?;
    let app = build_router(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;

    info!("playlens listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
