//! Ingestion Gateway Observability
//!
//! - [`logging`]: structured `tracing` initialization
//! - [`metrics`]: Prometheus counters/histograms for the pipeline stages
//!   named in §5 (request counts, lane outcomes, job transitions)
//! - [`health`]: `/healthz`, `/readyz`, `/metrics` endpoints

pub mod health;
pub mod logging;
pub mod metrics;
