//! IngestGate server binary.
//!
//! Usage:
//! ```bash
//! DATABASE_URL=postgres://... INTERNAL_JWT_SECRET=... ingestgate-server
//! ```
//!
//! Test with:
//! ```bash
//! curl http://localhost:8080/text/clean \
//!   -H "Authorization: Bearer <token>" \
//!   -H "Content-Type: application/json" \
//!   -d '{"text": "um hello there"}'
//! ```

use clap::Parser;
use ingestgate_server::config::ServerConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ingestgate_observability::logging::init();

    let config = ServerConfig::parse();

    let bootstrap = match ingestgate_server::bootstrap::bootstrap(&config).await {
        Ok(bootstrap) => bootstrap,
        Err(err) => {
            error!(error = %err, "failed to initialize ingestgate-server");
            return Err(err);
        }
    };

    let metrics = bootstrap.state.metrics.clone();
    let app = ingestgate_server::build_router(bootstrap.state, metrics);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ingestgate-server listening on http://{addr}");
    info!("  - text endpoint:   POST http://{addr}/text/clean");
    info!("  - batch endpoint:  POST http://{addr}/batch/process");
    info!("  - upload init:     POST http://{addr}/upload/init");
    info!("  - live session:    WS   http://{addr}/listen");
    info!("  - health check:    GET  http://{addr}/healthz");
    info!("  - metrics:         GET  http://{addr}/metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
