//! Upgate Server
//!
//! Main entry point for the upload gateway.

use tokio::net::TcpListener;
use tracing::{error, info};

use upgate_api::{AppState, create_router};
use upgate_core::storage::S3Uploader;
use upgate_shared::{AppConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load();

    // Initialize tracing
    telemetry::init_telemetry(&config)?;

    // Storage must be usable before the listener binds
    let uploader = S3Uploader::connect(&config.s3).await.inspect_err(|e| {
        error!(error = %e, "could not initialize object storage");
    })?;
    info!(bucket = %uploader.bucket(), "Object storage ready");

    let port = config.server_port;
    let seq_url = config.seq.url.clone();

    // Create router
    let app = create_router(AppState::new(uploader, config));

    // Start server
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    info!("Logs sent to {}", seq_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
}
