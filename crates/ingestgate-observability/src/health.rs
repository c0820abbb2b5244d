//! `/healthz`, `/readyz`, `/metrics` — operational endpoints, separate
//! from the ingestion surface in §6.1 so they can be scraped without
//! going through identity resolution.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Checked by `/readyz`: things that must be true before the service
/// should receive traffic (DB reachable, at minimum).
pub trait ReadinessChecker: Send + Sync {
    fn is_ready(&self) -> bool;
}

#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    pub fn with_readiness_checker(metrics: Arc<Metrics>, checker: Arc<dyn ReadinessChecker>) -> Self {
        Self {
            metrics,
            readiness_checker: Some(checker),
        }
    }
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".to_string() })
}

async fn readyz(State(state): State<HealthState>) -> Response {
    let ready = state
        .readiness_checker
        .as_ref()
        .map(|checker| checker.is_ready())
        .unwrap_or(true);

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
        }),
    )
        .into_response()
}

async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let families = state.metrics.registry().gather();
    match encoder.encode_to_string(&families) {
        Ok(body) => (StatusCode::OK, [("Content-Type", "text/plain; version=0.0.4")], body).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to encode metrics: {err}")).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct AlwaysReady;
    impl ReadinessChecker for AlwaysReady {
        fn is_ready(&self) -> bool {
            true
        }
    }

    struct NeverReady;
    impl ReadinessChecker for NeverReady {
        fn is_ready(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn healthz_always_returns_ok() {
        let state = HealthState::new(Arc::new(Metrics::new().unwrap()));
        let app = health_router(state);
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readyz_reflects_the_checker() {
        let state = HealthState::with_readiness_checker(Arc::new(Metrics::new().unwrap()), Arc::new(NeverReady));
        let app = health_router(state);
        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn readyz_defaults_to_ready_without_a_checker() {
        let state = HealthState::new(Arc::new(Metrics::new().unwrap()));
        let app = health_router(state);
        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_prometheus_text_format() {
        let state = HealthState::new(Arc::new(Metrics::new().unwrap()));
        let app = health_router(state);
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn alway_ready_checker_returns_ready() {
        let state = HealthState::with_readiness_checker(Arc::new(Metrics::new().unwrap()), Arc::new(AlwaysReady));
        let app = health_router(state);
        let response = app
            .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
