//! §4.6.2/§4.6.3: persist the five summary rows and the extracted insight
//! rows for one interaction inside a single transaction. Either all of it
//! lands or none of it does (§8 invariant 13).

use ingestgate_core::envelope::InteractionType;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::intelligence::{InteractionInsight, InteractionSummaryEntry, Severity};
use sqlx::PgPool;

#[derive(Clone)]
pub struct IntelligenceRepository {
    pool: PgPool,
}

impl IntelligenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve `persona_code` to its id and persist both row sets
    /// atomically. Aborts with [`Error::PersonaUnknown`] if the code
    /// doesn't exist, leaving nothing written.
    pub async fn persist(
        &self,
        persona_code: &str,
        summaries: &[InteractionSummaryEntry],
        insights: &[InteractionInsight],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(format!("failed to begin intelligence transaction: {e}")))?;

        let persona_id: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT id FROM personas WHERE code = $1")
                .bind(persona_code)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| Error::Database(format!("failed to look up persona: {e}")))?;
        let persona_id = persona_id.ok_or_else(|| Error::PersonaUnknown(persona_code.to_string()))?;

        for entry in summaries {
            sqlx::query(
                r#"
                INSERT INTO interaction_summary_entries (
                    interaction_id, persona_id, level, text, word_count, profile_type,
                    source, tenant_id, trace_id, interaction_type, account_id, interaction_timestamp
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
                ON CONFLICT (interaction_id, persona_id, level) DO UPDATE SET
                    text = EXCLUDED.text,
                    word_count = EXCLUDED.word_count
                "#,
            )
            .bind(entry.interaction_id)
            .bind(persona_id)
            .bind(entry.level.as_str())
            .bind(&entry.text)
            .bind(entry.word_count)
            .bind(&entry.profile_type)
            .bind(&entry.source)
            .bind(entry.tenant_id)
            .bind(&entry.trace_id)
            .bind(interaction_type_str(entry.interaction_type))
            .bind(&entry.account_id)
            .bind(entry.interaction_timestamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(format!("failed to insert summary entry: {e}")))?;
        }

        for row in insights {
            sqlx::query(
                r#"
                INSERT INTO interaction_insights (
                    interaction_id, type, content_hash, tenant_id, trace_id, interaction_type,
                    account_id, interaction_timestamp, description, owner, due_date, decision,
                    rationale, risk, severity, mitigation, text
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
                "#,
            )
            .bind(row.interaction_id)
            .bind(row.insight_type.as_str())
            .bind(&row.content_hash)
            .bind(row.tenant_id)
            .bind(&row.trace_id)
            .bind(interaction_type_str(row.interaction_type))
            .bind(&row.account_id)
            .bind(row.interaction_timestamp)
            .bind(&row.description)
            .bind(&row.owner)
            .bind(row.due_date)
            .bind(&row.decision)
            .bind(&row.rationale)
            .bind(&row.risk)
            .bind(row.severity.map(Severity::as_str))
            .bind(&row.mitigation)
            .bind(&row.text)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(format!("failed to insert insight: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::Database(format!("failed to commit intelligence transaction: {e}")))?;
        Ok(())
    }
}

fn interaction_type_str(t: InteractionType) -> &'static str {
    match t {
        InteractionType::Transcript => "transcript",
        InteractionType::Note => "note",
        InteractionType::Meeting => "meeting",
        InteractionType::BatchUpload => "batch_upload",
        InteractionType::Document => "document",
    }
}
