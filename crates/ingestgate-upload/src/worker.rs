//! §4.10.5 background worker: `queued -> processing -> {succeeded, failed}`
//! driving D (transcription) -> E (cleaner) -> G (orchestrator) from a
//! stored object key.

use std::sync::Arc;
use std::time::Duration;

use ingestgate_cleaner::Cleaner;
use ingestgate_core::context::RequestContext;
use ingestgate_core::envelope::{ContentFormat, EnvelopeSource, InteractionType};
use ingestgate_core::error::Error;
use ingestgate_core::ports::TranscriptionProvider;
use ingestgate_db::UploadJobRepository;
use ingestgate_observability::metrics::Metrics;
use ingestgate_orchestrator::{Orchestrator, OrchestratorRequest};
use serde_json::Map;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::queue::JobQueueReceiver;
use crate::service::UploadJobService;

/// How often the worker falls back to polling the `upload_jobs` table for
/// a queued job that the in-process channel never delivered.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct UploadWorker {
    repo: UploadJobRepository,
    service: Arc<UploadJobService>,
    transcription: Arc<dyn TranscriptionProvider>,
    cleaner: Arc<Cleaner>,
    orchestrator: Arc<Orchestrator>,
    metrics: Arc<Metrics>,
}

impl UploadWorker {
    pub fn new(
        repo: UploadJobRepository,
        service: Arc<UploadJobService>,
        transcription: Arc<dyn TranscriptionProvider>,
        cleaner: Arc<Cleaner>,
        orchestrator: Arc<Orchestrator>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            repo,
            service,
            transcription,
            cleaner,
            orchestrator,
            metrics,
        }
    }

    /// Runs forever, draining `receiver` and polling as a fallback.
    /// Intended to be spawned once at startup (§4.10.6: "at most one
    /// worker may observe a job in `processing` at a time" is enforced by
    /// the CAS in the repository, not by running a single worker task —
    /// this loop may safely be spawned more than once for throughput).
    pub async fn run(self: Arc<Self>, mut receiver: JobQueueReceiver) {
        loop {
            let job_id = tokio::select! {
                notified = receiver.recv() => notified,
                _ = tokio::time::sleep(POLL_INTERVAL) => None,
            };

            let claimed = match job_id {
                Some(id) => {
                    if self.repo.try_claim_processing(id).await.unwrap_or(false) {
                        self.repo.find_by_id(id).await.ok().flatten()
                    } else {
                        None
                    }
                }
                None => match self.repo.claim_any_queued().await {
                    Ok(job) => job,
                    Err(err) => {
                        error!(error = %err, "failed to poll for queued upload jobs");
                        None
                    }
                },
            };

            if claimed.is_some() {
                self.metrics
                    .upload_job_transitions_total
                    .with_label_values(&["processing"])
                    .inc();
            }

            let Some(job) = claimed else { continue };
            self.process_claimed_job(job).await;
        }
    }

    async fn process_claimed_job(&self, job: ingestgate_core::upload::UploadJob) {
        info!(job_id = %job.id, tenant_id = %job.tenant_id, "processing upload job");

        if let Err(err) = self.process(&job).await {
            warn!(job_id = %job.id, error = %err, "upload job failed");
            let _ = self.repo.mark_failed(job.id, err.code(), &truncate(&err.to_string())).await;
            self.metrics
                .upload_job_transitions_total
                .with_label_values(&["failed"])
                .inc();
        }
    }

    async fn process(&self, job: &ingestgate_core::upload::UploadJob) -> ingestgate_core::error::Result<()> {
        let mime_type = job
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let read_url = self
            .service
            .presign_get(&job.file_key)
            .await
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;

        let raw = self
            .transcription
            .transcribe_from_url(&read_url, &mime_type)
            .await
            .map_err(|e| Error::TranscriptionFailed(e.to_string()))?;

        let cleaned = self.cleaner.clean(&raw.text).await;

        let ctx = RequestContext::for_upload_job(
            job.tenant_id,
            job.user_id.clone(),
            job.pg_user_id.clone(),
            job.user_name.clone(),
            job.account_id.clone(),
            job.interaction_id,
            job.trace_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::new_v4),
        );

        let mut extras = Map::new();
        if let Some(name) = &ctx.user_name {
            extras.insert("user_name".to_string(), serde_json::Value::from(name.clone()));
        }

        self.orchestrator
            .run(OrchestratorRequest {
                tenant_id: ctx.tenant_id,
                user_id: ctx.user_id.clone(),
                interaction_id: ctx.interaction_id,
                trace_id: ctx.trace_id.to_string(),
                account_id: ctx.account_id.clone(),
                interaction_type: InteractionType::Transcript,
                source: EnvelopeSource::Upload,
                content_format: ContentFormat::Diarized,
                cleaned_text: cleaned.clone(),
                extras,
            })
            .await;

        let summary = format!(
            "transcribed {} chars, cleaned {} chars",
            raw.text.len(),
            cleaned.len()
        );
        self.repo
            .mark_succeeded(job.id, &summary)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        self.metrics
            .upload_job_transitions_total
            .with_label_values(&["succeeded"])
            .inc();

        Ok(())
    }
}

fn truncate(message: &str) -> String {
    const MAX: usize = 500;
    if message.chars().count() <= MAX {
        return message.to_string();
    }
    let head: String = message.chars().take(MAX).collect();
    format!("{head}...")
}
