//! Durable record of an async upload job (§3.1 `UploadJob`, §4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    AudioTranscription,
    TextProcessing,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::AudioTranscription => "audio_transcription",
            JobType::TextProcessing => "text_processing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "audio_transcription" => Some(JobType::AudioTranscription),
            "text_processing" => Some(JobType::TextProcessing),
            _ => None,
        }
    }
}

/// §4.10.4 state machine. `queued -> processing -> {succeeded, failed}`,
/// plus the early `queued -> failed` edge for unrecoverable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "succeeded" => Some(JobStatus::Succeeded),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJob {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: String,
    pub pg_user_id: Option<String>,
    pub user_name: Option<String>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub file_key: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub interaction_id: Uuid,
    pub trace_id: Option<String>,
    pub account_id: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
    pub result_summary: Option<String>,
    pub metadata_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
