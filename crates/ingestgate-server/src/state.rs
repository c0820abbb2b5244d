//! `AppState`: the dependency-injected handles every handler shares.
//! Built once at bootstrap (§4.12 "process-wide mutable state") and
//! cloned (cheap — every field is an `Arc`) into each request.

use std::sync::Arc;

use axum::extract::FromRef;
use ingestgate_cleaner::Cleaner;
use ingestgate_core::ports::{LiveTranscriptionProvider, SessionBufferStore, TranscriptionProvider};
use ingestgate_identity::config::IdentityConfig;
use ingestgate_observability::metrics::Metrics;
use ingestgate_orchestrator::{run_detached, Orchestrator, OrchestratorOutcome, OrchestratorRequest};
use ingestgate_upload::UploadJobService;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub identity_config: Arc<IdentityConfig>,
    pub cleaner: Arc<Cleaner>,
    pub transcription: Arc<dyn TranscriptionProvider>,
    pub live_transcription: Arc<dyn LiveTranscriptionProvider>,
    pub session_buffer: Arc<dyn SessionBufferStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub upload_jobs: Arc<UploadJobService>,
    pub metrics: Arc<Metrics>,
    pub db_pool: PgPool,
    pub detach_orchestrator_lanes: bool,
}

impl AppState {
    /// §4.7/§5: runs the two lanes either awaited inline (the HTTP response
    /// is built only after both settle) or detached to a background task
    /// (the response goes out first; a caller disconnect can't be observed
    /// as cancellation because the lanes are no longer tied to the
    /// request's future). Detached callers get a default outcome back
    /// immediately — they never had a use for the real one, since every
    /// sync endpoint already discards `run`'s result.
    pub async fn dispatch_pipeline(&self, request: OrchestratorRequest) -> OrchestratorOutcome {
        if self.detach_orchestrator_lanes {
            tokio::spawn(run_detached(self.orchestrator.clone(), request));
            OrchestratorOutcome::default()
        } else {
            self.orchestrator.run(request).await
        }
    }
}

impl FromRef<AppState> for Arc<IdentityConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.identity_config.clone()
    }
}
