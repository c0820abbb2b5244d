//! `RequestContext` — resolved once per request at the edge, then passed by
//! shared reference to every downstream lane. See [`crate::error`] for the
//! failure modes that prevent one from being constructed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and correlation data resolved by `ingestgate-identity` and
/// carried, read-only, through the cleaner, orchestrator and both
/// concurrent lanes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    /// Opaque, possibly provider-prefixed (e.g. `"auth0|abc123"`). Never a UUID.
    pub user_id: String,
    pub pg_user_id: Option<String>,
    pub user_name: Option<String>,
    pub account_id: Option<String>,
    pub interaction_id: Uuid,
    pub trace_id: Uuid,
}

impl RequestContext {
    /// Build a context for a freshly accepted request. `interaction_id` is
    /// always freshly minted here; callers that need to inherit one (the
    /// upload worker, resuming a job) should construct the struct directly.
    pub fn new(
        tenant_id: Uuid,
        user_id: String,
        pg_user_id: Option<String>,
        user_name: Option<String>,
        account_id: Option<String>,
        trace_id: Option<Uuid>,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            pg_user_id,
            user_name,
            account_id,
            interaction_id: Uuid::new_v4(),
            trace_id: trace_id.unwrap_or_else(Uuid::new_v4),
        }
    }

    /// Rebuild a context for the upload worker, inheriting the
    /// `interaction_id` recorded at job-creation time instead of minting a
    /// new one (§4.1: "unless explicitly passed in by an internal caller").
    pub fn for_upload_job(
        tenant_id: Uuid,
        user_id: String,
        pg_user_id: Option<String>,
        user_name: Option<String>,
        account_id: Option<String>,
        interaction_id: Uuid,
        trace_id: Uuid,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            pg_user_id,
            user_name,
            account_id,
            interaction_id,
            trace_id,
        }
    }
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
