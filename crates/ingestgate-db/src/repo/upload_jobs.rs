//! §4.10 durable `upload_jobs` repository. Status transitions are atomic
//! SQL updates guarded by a `WHERE status = ...` (§4.10.4/§4.10.6 CAS).

use chrono::{DateTime, Utc};
use ingestgate_core::error::{Error, Result};
use ingestgate_core::upload::{JobStatus, JobType, UploadJob};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(FromRow)]
struct UploadJobRow {
    id: Uuid,
    tenant_id: Uuid,
    user_id: String,
    pg_user_id: Option<String>,
    user_name: Option<String>,
    job_type: String,
    status: String,
    file_key: String,
    file_name: Option<String>,
    mime_type: Option<String>,
    file_size: Option<i64>,
    interaction_id: Uuid,
    trace_id: Option<String>,
    account_id: Option<String>,
    error_message: Option<String>,
    error_code: Option<String>,
    result_summary: Option<String>,
    metadata_json: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<UploadJobRow> for UploadJob {
    type Error = Error;

    fn try_from(row: UploadJobRow) -> Result<Self> {
        Ok(UploadJob {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            pg_user_id: row.pg_user_id,
            user_name: row.user_name,
            job_type: JobType::parse(&row.job_type)
                .ok_or_else(|| Error::Internal(format!("unknown job_type in row: {}", row.job_type)))?,
            status: JobStatus::parse(&row.status)
                .ok_or_else(|| Error::Internal(format!("unknown status in row: {}", row.status)))?,
            file_key: row.file_key,
            file_name: row.file_name,
            mime_type: row.mime_type,
            file_size: row.file_size,
            interaction_id: row.interaction_id,
            trace_id: row.trace_id,
            account_id: row.account_id,
            error_message: row.error_message,
            error_code: row.error_code,
            result_summary: row.result_summary,
            metadata_json: row.metadata_json,
            created_at: row.created_at,
            updated_at: row.updated_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(Clone)]
pub struct UploadJobRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = "id, tenant_id, user_id, pg_user_id, user_name, job_type, status, \
    file_key, file_name, mime_type, file_size, interaction_id, trace_id, account_id, \
    error_message, error_code, result_summary, metadata_json, created_at, updated_at, \
    started_at, completed_at";

impl UploadJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// §4.10.1 step 3: insert the `queued` row created at `init` time.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(&self, job: &UploadJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO upload_jobs (
                id, tenant_id, user_id, pg_user_id, user_name, job_type, status,
                file_key, file_name, mime_type, file_size, interaction_id, trace_id,
                account_id, metadata_json, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
            "#,
        )
        .bind(job.id)
        .bind(job.tenant_id)
        .bind(&job.user_id)
        .bind(&job.pg_user_id)
        .bind(&job.user_name)
        .bind(job.job_type.as_str())
        .bind(job.status.as_str())
        .bind(&job.file_key)
        .bind(&job.file_name)
        .bind(&job.mime_type)
        .bind(job.file_size)
        .bind(job.interaction_id)
        .bind(&job.trace_id)
        .bind(&job.account_id)
        .bind(&job.metadata_json)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to insert upload job: {e}")))?;
        Ok(())
    }

    /// §4.10.2 precondition lookup: `(tenant_id, file_key)` is unique.
    pub async fn find_by_tenant_and_file_key(
        &self,
        tenant_id: Uuid,
        file_key: &str,
    ) -> Result<Option<UploadJob>> {
        let row: Option<UploadJobRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM upload_jobs WHERE tenant_id = $1 AND file_key = $2"
        ))
        .bind(tenant_id)
        .bind(file_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to look up upload job: {e}")))?;
        row.map(UploadJob::try_from).transpose()
    }

    /// §4.10.3 status lookup, tenant-scoped (§8 invariant 14: cross-tenant
    /// access must look identical to "doesn't exist").
    pub async fn find_by_id_for_tenant(&self, tenant_id: Uuid, job_id: Uuid) -> Result<Option<UploadJob>> {
        let row: Option<UploadJobRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM upload_jobs WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(job_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to look up upload job: {e}")))?;
        row.map(UploadJob::try_from).transpose()
    }

    /// Fetch by id without tenant scoping, used internally by the worker
    /// once a job id has already been claimed.
    pub async fn find_by_id(&self, job_id: Uuid) -> Result<Option<UploadJob>> {
        let row: Option<UploadJobRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM upload_jobs WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to look up upload job: {e}")))?;
        row.map(UploadJob::try_from).transpose()
    }

    /// §4.10.4/§4.10.6: atomic `queued -> processing`. Returns `false` (not
    /// an error) if another worker already claimed it — the caller should
    /// drop the job silently (§4.10.5 step 1).
    pub async fn try_claim_processing(&self, job_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE upload_jobs SET status = 'processing', started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'queued'",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to claim upload job: {e}")))?;
        Ok(result.rows_affected() == 1)
    }

    /// Polling fallback for the worker: atomically claim the oldest queued
    /// job system-wide (used when a job wasn't (or couldn't be) delivered
    /// over the in-process enqueue channel, e.g. after a restart).
    pub async fn claim_any_queued(&self) -> Result<Option<UploadJob>> {
        let row: Option<UploadJobRow> = sqlx::query_as(&format!(
            r#"
            UPDATE upload_jobs
            SET status = 'processing', started_at = NOW(), updated_at = NOW()
            WHERE id = (
                SELECT id FROM upload_jobs
                WHERE status = 'queued'
                ORDER BY created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to claim a queued upload job: {e}")))?;
        row.map(UploadJob::try_from).transpose()
    }

    /// §4.10.4 terminal transition: `processing -> succeeded`.
    pub async fn mark_succeeded(&self, job_id: Uuid, result_summary: &str) -> Result<()> {
        sqlx::query(
            "UPDATE upload_jobs SET status = 'succeeded', result_summary = $2, \
             completed_at = NOW(), updated_at = NOW() WHERE id = $1 AND status = 'processing'",
        )
        .bind(job_id)
        .bind(result_summary)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to mark upload job succeeded: {e}")))?;
        Ok(())
    }

    /// §4.10.4/§4.10.5 terminal transition from either `queued` (unrecoverable
    /// input) or `processing` (failure mid-pipeline) to `failed`.
    pub async fn mark_failed(&self, job_id: Uuid, error_code: &str, error_message: &str) -> Result<()> {
        sqlx::query(
            "UPDATE upload_jobs SET status = 'failed', error_code = $2, error_message = $3, \
             completed_at = NOW(), updated_at = NOW() WHERE id = $1 AND status != 'succeeded' AND status != 'failed'",
        )
        .bind(job_id)
        .bind(error_code)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to mark upload job failed: {e}")))?;
        Ok(())
    }
}
