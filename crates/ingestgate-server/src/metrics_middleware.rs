//! Per-request `requests_total`/`request_duration_seconds` (§6.6
//! observability). Grounded on the teacher's request-context middleware
//! shape (`lunaroute-ingress::middleware::request_context_middleware`):
//! wrap `next.run`, time it, and record the outcome afterward.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use ingestgate_observability::metrics::Metrics;

pub async fn record_request_metrics(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;
    let duration_secs = start.elapsed().as_secs_f64();

    let outcome = if response.status().is_success() || response.status().is_redirection() {
        "ok"
    } else {
        "error"
    };
    metrics.record_request(&endpoint, outcome, duration_secs);

    response
}
