//! §4.10.1–§4.10.3: `init`, `complete`, `status`. This is the durable,
//! tenant-scoped half of the state machine; [`crate::worker`] owns the
//! rest.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ingestgate_core::context::RequestContext;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::ObjectStore;
use ingestgate_core::upload::{JobStatus, JobType, UploadJob};
use ingestgate_db::UploadJobRepository;
use ingestgate_observability::metrics::Metrics;
use uuid::Uuid;

use crate::queue::JobQueue;

/// §6.2: presigned PUT URLs are valid for ~5 minutes from issuance.
const PUT_URL_TTL: Duration = Duration::from_secs(5 * 60);
/// Worker reads are not time-critical; a generous window avoids racing a
/// slow transcription call against a GET URL that expired mid-job.
const GET_URL_TTL: Duration = Duration::from_secs(60 * 60);

pub struct InitRequest {
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

pub struct InitResponse {
    pub upload_url: String,
    pub file_key: String,
    pub job_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

pub struct CompleteRequest {
    pub file_key: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

pub struct CompleteResponse {
    pub job_id: Uuid,
    pub interaction_id: Uuid,
    pub status: JobStatus,
}

pub struct UploadJobService {
    repo: UploadJobRepository,
    object_store: Arc<dyn ObjectStore>,
    queue: JobQueue,
    metrics: Arc<Metrics>,
}

impl UploadJobService {
    pub fn new(
        repo: UploadJobRepository,
        object_store: Arc<dyn ObjectStore>,
        queue: JobQueue,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            repo,
            object_store,
            queue,
            metrics,
        }
    }

    /// §4.10.1.
    pub async fn init(&self, ctx: &RequestContext, req: InitRequest) -> Result<InitResponse> {
        let job_id = Uuid::new_v4();
        let safe_name = sanitize_filename(req.filename.as_deref())?;
        let file_key = format!("tenant/{}/uploads/{}/{}", ctx.tenant_id, job_id, safe_name);
        let mime_type = req.mime_type.unwrap_or_else(|| "application/octet-stream".to_string());

        let now = Utc::now();
        let job = UploadJob {
            id: job_id,
            tenant_id: ctx.tenant_id,
            user_id: ctx.user_id.clone(),
            pg_user_id: ctx.pg_user_id.clone(),
            user_name: ctx.user_name.clone(),
            job_type: JobType::AudioTranscription,
            status: JobStatus::Queued,
            file_key: file_key.clone(),
            file_name: req.filename,
            mime_type: Some(mime_type.clone()),
            file_size: req.file_size,
            interaction_id: Uuid::new_v4(),
            trace_id: Some(ctx.trace_id.to_string()),
            account_id: ctx.account_id.clone(),
            error_message: None,
            error_code: None,
            result_summary: None,
            metadata_json: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        };

        self.repo.insert(&job).await?;
        self.metrics
            .upload_job_transitions_total
            .with_label_values(&["queued"])
            .inc();

        let (upload_url, expires_at) = self
            .object_store
            .presign_put(&file_key, &mime_type, PUT_URL_TTL)
            .await?;

        Ok(InitResponse {
            upload_url,
            file_key,
            job_id,
            expires_at,
        })
    }

    /// §4.10.2. Cross-tenant and unknown-key lookups both surface as
    /// [`Error::NotFound`] (§8 invariant 14); wrong-state transitions
    /// surface as [`Error::Conflict`].
    pub async fn complete(&self, ctx: &RequestContext, req: CompleteRequest) -> Result<CompleteResponse> {
        let job = self
            .repo
            .find_by_tenant_and_file_key(ctx.tenant_id, &req.file_key)
            .await?
            .ok_or(Error::NotFound)?;

        if job.status != JobStatus::Queued {
            return Err(Error::Conflict);
        }

        self.queue.notify(job.id);

        Ok(CompleteResponse {
            job_id: job.id,
            interaction_id: job.interaction_id,
            status: JobStatus::Queued,
        })
    }

    /// §4.10.3, tenant-scoped identically to `complete`.
    pub async fn status(&self, ctx: &RequestContext, job_id: Uuid) -> Result<UploadJob> {
        self.repo
            .find_by_id_for_tenant(ctx.tenant_id, job_id)
            .await?
            .ok_or(Error::NotFound)
    }

    /// Used by the worker after claiming a job, to hand the uploaded
    /// bytes' object-store key back as a GET URL (§4.10.5 step 2).
    pub async fn presign_get(&self, file_key: &str) -> Result<String> {
        self.object_store.presign_get(file_key, GET_URL_TTL).await
    }
}

/// §4.10.1 step 2: reject filenames containing path separators so the
/// derived `file_key` can't escape its tenant/job prefix.
fn sanitize_filename(filename: Option<&str>) -> Result<String> {
    let Some(name) = filename else {
        return Ok("upload.bin".to_string());
    };
    if name.is_empty() {
        return Ok("upload.bin".to_string());
    }
    if name.contains('/') || name.contains('\\') || name == ".." {
        return Err(Error::ValidationMissingField(
            "filename must not contain path separators".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_rejects_path_separators() {
        assert!(sanitize_filename(Some("../../etc/passwd")).is_err());
        assert!(sanitize_filename(Some("a/b.mp3")).is_err());
        assert!(sanitize_filename(Some("a\\b.mp3")).is_err());
    }

    #[test]
    fn sanitize_filename_defaults_when_absent() {
        assert_eq!(sanitize_filename(None).unwrap(), "upload.bin");
        assert_eq!(sanitize_filename(Some("")).unwrap(), "upload.bin");
    }

    #[test]
    fn sanitize_filename_accepts_a_plain_name() {
        assert_eq!(sanitize_filename(Some("call.mp3")).unwrap(), "call.mp3");
    }
}
