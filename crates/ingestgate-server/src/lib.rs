//! IngestGate: the ingestion & processing core (§1-§8 of the design).
//!
//! This crate wires the other `ingestgate-*` crates into an axum
//! application: [`bootstrap`] builds the [`state::AppState`] from
//! [`config::ServerConfig`], [`routes`] holds one handler module per
//! §6.1 endpoint group, and [`router`] assembles them into the final
//! `Router`.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics_middleware;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use ingestgate_observability::health::{health_router, HealthState};
use ingestgate_observability::metrics::Metrics;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Assembles the full HTTP surface: the ingestion endpoints (§6.1) under
/// `state`, plus the operational `/healthz`, `/readyz`, `/metrics` trio
/// (kept on a separate `HealthState` so they never go through identity
/// resolution — scrapers don't carry a bearer token).
pub fn build_router(state: AppState, metrics: Arc<Metrics>) -> Router {
    let ingestion_router = Router::new()
        .route("/", get(routes::demo::demo_page))
        .route("/text/clean", post(routes::text::text_clean))
        .route("/batch/process", post(routes::batch::batch_process))
        .route("/upload/init", post(routes::upload::init))
        .route("/upload/complete", post(routes::upload::complete))
        .route("/upload/status/{job_id}", get(routes::upload::status))
        .route("/listen", get(routes::listen::listen))
        .route_layer(axum::middleware::from_fn_with_state(
            metrics.clone(),
            metrics_middleware::record_request_metrics,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let health_router = health_router(HealthState::new(metrics));

    ingestion_router.merge(health_router)
}
