//! Prometheus metrics for the ingestion pipeline. One registry per
//! process, injected into `ingestgate-server` at bootstrap and shared
//! (read-only after construction) across every handler and the upload
//! worker.

use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Requests received per endpoint, labeled by outcome (`ok`/`error`).
    pub requests_total: CounterVec,
    /// End-to-end handler latency, labeled by endpoint.
    pub request_duration_seconds: HistogramVec,

    /// Lane P / Lane I outcomes from the async-fork orchestrator (§4.7),
    /// labeled by lane (`publish`/`intelligence`) and outcome.
    pub lane_outcomes_total: CounterVec,

    /// `upload_jobs` state transitions, labeled by `to_status`.
    pub upload_job_transitions_total: CounterVec,

    /// Per-chunk cleaner fallbacks (§4.5: LLM failure/timeout -> raw chunk).
    pub cleaner_fallbacks_total: CounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("ingestgate_requests_total", "Total requests received per endpoint"),
            &["endpoint", "outcome"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ingestgate_request_duration_seconds",
                "End-to-end handler duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["endpoint"],
        )?;

        let lane_outcomes_total = CounterVec::new(
            Opts::new(
                "ingestgate_lane_outcomes_total",
                "Async-fork lane outcomes (publish / intelligence)",
            ),
            &["lane", "outcome"],
        )?;

        let upload_job_transitions_total = CounterVec::new(
            Opts::new(
                "ingestgate_upload_job_transitions_total",
                "Upload job state machine transitions",
            ),
            &["to_status"],
        )?;

        let cleaner_fallbacks_total = CounterVec::new(
            Opts::new(
                "ingestgate_cleaner_fallbacks_total",
                "Cleaner chunks that fell back to raw text",
            ),
            &["reason"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(lane_outcomes_total.clone()))?;
        registry.register(Box::new(upload_job_transitions_total.clone()))?;
        registry.register(Box::new(cleaner_fallbacks_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            request_duration_seconds,
            lane_outcomes_total,
            upload_job_transitions_total,
            cleaner_fallbacks_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Called once per completed HTTP request by the server's metrics
    /// middleware, labeled by route and `ok`/`error` outcome.
    pub fn record_request(&self, endpoint: &str, outcome: &str, duration_secs: f64) {
        self.requests_total.with_label_values(&[endpoint, outcome]).inc();
        self.request_duration_seconds
            .with_label_values(&[endpoint])
            .observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registers_every_metric_without_name_collisions() {
        let metrics = Metrics::new().unwrap();
        let families = metrics.registry().gather();
        assert_eq!(families.len(), 5);
    }

    #[test]
    fn record_request_increments_counter_and_observes_duration() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("/text/clean", "ok", 0.05);
        assert_eq!(
            metrics.requests_total.with_label_values(&["/text/clean", "ok"]).get(),
            1.0
        );
        assert_eq!(
            metrics
                .request_duration_seconds
                .with_label_values(&["/text/clean"])
                .get_sample_count(),
            1
        );
    }
}
