//! §4.7 Async-Fork Orchestrator: after the cleaner returns, run the
//! publish lane and the intelligence lane concurrently, absorbing
//! whatever either one does. Neither lane's outcome is visible to the
//! caller — the HTTP response is built from the cleaner output alone
//! (§8 invariant 12).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ingestgate_core::envelope::{ContentFormat, EnvelopeBuilder, EnvelopeSource, EnvelopeV1, InteractionType};
use ingestgate_core::intelligence::InteractionAnalysis;
use ingestgate_core::ports::{FanOutPublisher, PublishOutcome};
use ingestgate_intelligence::{IntelligenceExtractor, IntelligencePersister};
use ingestgate_observability::metrics::Metrics;
use serde_json::{Map, Value};
use tracing::error;
use uuid::Uuid;

/// Everything the orchestrator needs to build an envelope, independent of
/// which endpoint is calling it. Built from a `RequestContext` plus the
/// per-call `source`/`interaction_type`/`format` that only the calling
/// endpoint knows (§4.8/§4.9/§4.10.5).
#[allow(clippy::too_many_arguments)]
pub struct OrchestratorRequest {
    pub tenant_id: Uuid,
    pub user_id: String,
    pub interaction_id: Uuid,
    pub trace_id: String,
    pub account_id: Option<String>,
    pub interaction_type: InteractionType,
    pub source: EnvelopeSource,
    pub content_format: ContentFormat,
    pub cleaned_text: String,
    pub extras: Map<String, Value>,
}

pub struct Orchestrator {
    publisher: Arc<dyn FanOutPublisher>,
    extractor: Arc<IntelligenceExtractor>,
    persister: Arc<IntelligencePersister>,
    metrics: Arc<Metrics>,
}

/// What the two lanes actually did. The HTTP response for the synchronous
/// endpoints never depends on this; the live session endpoint is the one
/// caller that reads `analysis` back out, to build its closing
/// `session_complete` message (§4.9 step 3) from the same extraction Lane I
/// already ran, instead of calling the LLM a second time.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOutcome {
    pub publish: PublishOutcome,
    pub intelligence_persisted: bool,
    pub analysis: Option<InteractionAnalysis>,
}

impl Orchestrator {
    pub fn new(
        publisher: Arc<dyn FanOutPublisher>,
        extractor: Arc<IntelligenceExtractor>,
        persister: Arc<IntelligencePersister>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            publisher,
            extractor,
            persister,
            metrics,
        }
    }

    /// Run Lane P and Lane I concurrently. `tokio::join!` already gives us
    /// "run both to completion, return results as values" semantics — a
    /// panic inside either lane's future would still propagate, but every
    /// fallible step within each lane is already absorbed by its own crate
    /// (§4.3, §4.6), so there is nothing left here that can throw.
    pub async fn run(&self, request: OrchestratorRequest) -> OrchestratorOutcome {
        let interaction_timestamp: DateTime<Utc> = Utc::now();

        let envelope = EnvelopeBuilder::new()
            .extras(request.extras.clone())
            .account_id(request.account_id.clone())
            .build(
                request.tenant_id,
                request.user_id.clone(),
                request.interaction_type,
                request.cleaned_text.clone(),
                request.content_format,
                request.source,
                request.interaction_id,
                request.trace_id.clone(),
            );

        let (publish, (intelligence_persisted, analysis)) = tokio::join!(
            self.run_publish_lane(&envelope),
            self.run_intelligence_lane(&request, interaction_timestamp),
        );

        OrchestratorOutcome {
            publish,
            intelligence_persisted,
            analysis,
        }
    }

    async fn run_publish_lane(&self, envelope: &EnvelopeV1) -> PublishOutcome {
        let outcome = self.publisher.publish(envelope).await;
        let result = if outcome.stream_ack.is_some() || outcome.bus_ack.is_some() {
            "ok"
        } else {
            "error"
        };
        self.metrics
            .lane_outcomes_total
            .with_label_values(&["publish", result])
            .inc();
        outcome
    }

    async fn run_intelligence_lane(
        &self,
        request: &OrchestratorRequest,
        interaction_timestamp: DateTime<Utc>,
    ) -> (bool, Option<InteractionAnalysis>) {
        let analysis = match self.extractor.extract(&request.cleaned_text).await {
            Some(analysis) => analysis,
            None => {
                self.metrics
                    .lane_outcomes_total
                    .with_label_values(&["intelligence", "error"])
                    .inc();
                return (false, None);
            }
        };

        let persisted = self
            .persister
            .persist(
                &analysis,
                request.interaction_id,
                request.tenant_id,
                &request.trace_id,
                request.interaction_type,
                request.account_id.as_deref(),
                interaction_timestamp,
            )
            .await;

        self.metrics
            .lane_outcomes_total
            .with_label_values(&["intelligence", if persisted { "ok" } else { "error" }])
            .inc();

        (persisted, Some(analysis))
    }
}

/// Catches the case where spawning (rather than awaiting inline) a lane
/// panics — kept separate from `run` so callers that want the stronger
/// "survives a caller disconnect" shape (§5 cancellation) can opt in
/// without changing the common inline-await path used by every endpoint
/// in this crate.
pub async fn run_detached(
    orchestrator: Arc<Orchestrator>,
    request: OrchestratorRequest,
) -> OrchestratorOutcome {
    match tokio::spawn(async move { orchestrator.run(request).await }).await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            error!(error = %join_err, "orchestrator task panicked");
            OrchestratorOutcome::default()
        }
    }
}
