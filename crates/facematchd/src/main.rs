use anyhow::{Context, Result};
use facematch_core::OnnxFaceEmbedder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use facematchd::api::{create_router, AppState};
use facematchd::engine::spawn_engine;
use facematchd::{Config, SERVICE_NAME, SERVICE_VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    tracing::info!(
        service = SERVICE_NAME,
        version = SERVICE_VERSION,
        addr = %config.socket_addr(),
        debug = config.debug,
        model_dir = %config.model_dir.display(),
        "facematchd starting"
    );

    let embedder = OnnxFaceEmbedder::load(&config.model_dir)
        .with_context(|| format!("loading face models from {}", config.model_dir.display()))?;
    let engine = spawn_engine(embedder)?;

    let app = create_router(AppState::new(engine), config.max_body_bytes);

    let listener = TcpListener::bind(config.socket_addr()).await?;
    tracing::info!(addr = %config.socket_addr(), "facematchd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("facematchd shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
