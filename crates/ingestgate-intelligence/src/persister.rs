//! §4.6.2 persist contract: decompose one [`InteractionAnalysis`] into its
//! row sets and commit them atomically. Never rethrows — Lane I logs and
//! moves on (§4.7).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ingestgate_core::envelope::InteractionType;
use ingestgate_core::intelligence::{InteractionAnalysis, InteractionInsight, InteractionSummaryEntry};
use ingestgate_core::ports::LlmClient;
use ingestgate_db::IntelligenceRepository;
use tracing::warn;
use uuid::Uuid;

const DEFAULT_PERSONA_CODE: &str = "gtm";

pub struct IntelligencePersister {
    repo: IntelligenceRepository,
    llm: Arc<dyn LlmClient>,
}

impl IntelligencePersister {
    pub fn new(repo: IntelligenceRepository, llm: Arc<dyn LlmClient>) -> Self {
        Self { repo, llm }
    }

    fn source(&self) -> String {
        format!("{}:{}", self.llm.provider_name(), self.llm.model())
    }

    /// Returns `true` if the transaction committed. Failure is logged with
    /// `interaction_id` and never propagated to the caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn persist(
        &self,
        analysis: &InteractionAnalysis,
        interaction_id: Uuid,
        tenant_id: Uuid,
        trace_id: &str,
        interaction_type: InteractionType,
        account_id: Option<&str>,
        interaction_timestamp: DateTime<Utc>,
    ) -> bool {
        let persona_id_placeholder = Uuid::nil();
        let summaries = InteractionSummaryEntry::five_for(
            &analysis.summaries,
            interaction_id,
            persona_id_placeholder,
            &self.source(),
            tenant_id,
            trace_id,
            interaction_type,
            account_id,
            interaction_timestamp,
        );

        let insights = InteractionInsight::rows_for(
            analysis,
            interaction_id,
            tenant_id,
            trace_id,
            interaction_type,
            account_id,
            interaction_timestamp,
        );

        match self.repo.persist(DEFAULT_PERSONA_CODE, &summaries, &insights).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    error = %err,
                    interaction_id = %interaction_id,
                    "intelligence persist failed, rolled back"
                );
                false
            }
        }
    }
}
