//! In-memory extraction schema (§4.6.1) and the persisted row shapes it
//! decomposes into (§4.6.3). Kept transport/storage-agnostic: `ingestgate-
//! intelligence` owns the extraction call, `ingestgate-db` owns the SQL
//! encoding.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::envelope::InteractionType;

/// The five fixed summary levels, always emitted together (§3.1 invariant:
/// exactly five rows per successful extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLevel {
    Title,
    Headline,
    Brief,
    Detailed,
    Spotlight,
}

impl SummaryLevel {
    pub const ALL: [SummaryLevel; 5] = [
        SummaryLevel::Title,
        SummaryLevel::Headline,
        SummaryLevel::Brief,
        SummaryLevel::Detailed,
        SummaryLevel::Spotlight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SummaryLevel::Title => "title",
            SummaryLevel::Headline => "headline",
            SummaryLevel::Brief => "brief",
            SummaryLevel::Detailed => "detailed",
            SummaryLevel::Spotlight => "spotlight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

/// Polymorphic row discriminator (§3.1 `InteractionInsight`, §4.6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    ActionItem,
    KeyTakeaway,
    DecisionMade,
    Risk,
    ProductFeedback,
    MarketIntelligence,
    Unknown,
}

impl InsightType {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightType::ActionItem => "action_item",
            InsightType::KeyTakeaway => "key_takeaway",
            InsightType::DecisionMade => "decision_made",
            InsightType::Risk => "risk",
            InsightType::ProductFeedback => "product_feedback",
            InsightType::MarketIntelligence => "market_intelligence",
            InsightType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Summaries {
    pub title: String,
    pub headline: String,
    pub brief: String,
    pub detailed: String,
    pub spotlight: String,
}

impl Summaries {
    pub fn get(&self, level: SummaryLevel) -> &str {
        match level {
            SummaryLevel::Title => &self.title,
            SummaryLevel::Headline => &self.headline,
            SummaryLevel::Brief => &self.brief,
            SummaryLevel::Detailed => &self.detailed,
            SummaryLevel::Spotlight => &self.spotlight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub decision: String,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub risk: String,
    pub severity: Severity,
    #[serde(default)]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNote {
    pub text: String,
}

/// `extract()`'s fixed output schema (§4.6.1). Never persisted directly;
/// `InteractionInsight::rows_for` decomposes it per §4.6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionAnalysis {
    pub summaries: Summaries,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub product_feedback: Vec<TextNote>,
    #[serde(default)]
    pub market_intelligence: Vec<TextNote>,
}

/// One `(interaction_id, persona_id, level)` row (§3.1 `InteractionSummaryEntry`).
#[derive(Debug, Clone)]
pub struct InteractionSummaryEntry {
    pub interaction_id: Uuid,
    pub persona_id: Uuid,
    pub level: SummaryLevel,
    pub text: String,
    pub word_count: i32,
    pub profile_type: String,
    pub source: String,
    pub tenant_id: Uuid,
    pub trace_id: String,
    pub interaction_type: InteractionType,
    pub account_id: Option<String>,
    pub interaction_timestamp: DateTime<Utc>,
}

impl InteractionSummaryEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interaction_id: Uuid,
        persona_id: Uuid,
        level: SummaryLevel,
        text: String,
        source: String,
        tenant_id: Uuid,
        trace_id: String,
        interaction_type: InteractionType,
        account_id: Option<String>,
        interaction_timestamp: DateTime<Utc>,
    ) -> Self {
        let word_count = text.split_whitespace().count() as i32;
        Self {
            interaction_id,
            persona_id,
            level,
            text,
            word_count,
            profile_type: "rich".to_string(),
            source,
            tenant_id,
            trace_id,
            interaction_type,
            account_id,
            interaction_timestamp,
        }
    }

    /// Build the five fixed rows for one successful extraction.
    #[allow(clippy::too_many_arguments)]
    pub fn five_for(
        analysis: &Summaries,
        interaction_id: Uuid,
        persona_id: Uuid,
        source: &str,
        tenant_id: Uuid,
        trace_id: &str,
        interaction_type: InteractionType,
        account_id: Option<&str>,
        interaction_timestamp: DateTime<Utc>,
    ) -> Vec<InteractionSummaryEntry> {
        SummaryLevel::ALL
            .into_iter()
            .map(|level| {
                InteractionSummaryEntry::new(
                    interaction_id,
                    persona_id,
                    level,
                    analysis.get(level).to_string(),
                    source.to_string(),
                    tenant_id,
                    trace_id.to_string(),
                    interaction_type,
                    account_id.map(str::to_string),
                    interaction_timestamp,
                )
            })
            .collect()
    }
}

/// Polymorphic insight row (§3.1 `InteractionInsight`). Unused columns for
/// a given `insight_type` stay `None` — this is the "one physical table,
/// many nullable columns" shape from §9's design notes.
#[derive(Debug, Clone)]
pub struct InteractionInsight {
    pub interaction_id: Uuid,
    pub insight_type: InsightType,
    pub content_hash: String,
    pub tenant_id: Uuid,
    pub trace_id: String,
    pub interaction_type: InteractionType,
    pub account_id: Option<String>,
    pub interaction_timestamp: DateTime<Utc>,

    pub description: Option<String>,
    pub owner: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub decision: Option<String>,
    pub rationale: Option<String>,
    pub risk: Option<String>,
    pub severity: Option<Severity>,
    pub mitigation: Option<String>,
    pub text: Option<String>,
}

/// `content_hash(type, content) = SHA-256_hex(type + ":" + content)` (§4.6.3).
pub fn content_hash(insight_type: InsightType, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(insight_type.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl InteractionInsight {
    fn base(
        interaction_id: Uuid,
        insight_type: InsightType,
        content_for_hash: &str,
        tenant_id: Uuid,
        trace_id: &str,
        interaction_type: InteractionType,
        account_id: Option<&str>,
        interaction_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            interaction_id,
            insight_type,
            content_hash: content_hash(insight_type, content_for_hash),
            tenant_id,
            trace_id: trace_id.to_string(),
            interaction_type,
            account_id: account_id.map(str::to_string),
            interaction_timestamp,
            description: None,
            owner: None,
            due_date: None,
            decision: None,
            rationale: None,
            risk: None,
            severity: None,
            mitigation: None,
            text: None,
        }
    }

    /// Decompose one [`InteractionAnalysis`] into its insight rows exactly
    /// per the §4.6.3 mapping table. `product_feedback` and
    /// `market_intelligence` map directly to their own `InsightType` —
    /// never coerced into `key_takeaway` (§8 invariant 10).
    #[allow(clippy::too_many_arguments)]
    pub fn rows_for(
        analysis: &InteractionAnalysis,
        interaction_id: Uuid,
        tenant_id: Uuid,
        trace_id: &str,
        interaction_type: InteractionType,
        account_id: Option<&str>,
        interaction_timestamp: DateTime<Utc>,
    ) -> Vec<InteractionInsight> {
        let mut rows = Vec::new();

        for item in &analysis.action_items {
            let mut row = Self::base(
                interaction_id,
                InsightType::ActionItem,
                &item.description,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.description = Some(item.description.clone());
            row.owner = item.owner.clone();
            row.due_date = item
                .due_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc());
            rows.push(row);
        }

        for d in &analysis.decisions {
            let mut row = Self::base(
                interaction_id,
                InsightType::DecisionMade,
                &d.decision,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.decision = Some(d.decision.clone());
            row.rationale = d.rationale.clone();
            rows.push(row);
        }

        for r in &analysis.risks {
            let mut row = Self::base(
                interaction_id,
                InsightType::Risk,
                &r.risk,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.risk = Some(r.risk.clone());
            row.severity = Some(r.severity);
            row.mitigation = r.mitigation.clone();
            rows.push(row);
        }

        for t in &analysis.key_takeaways {
            let mut row = Self::base(
                interaction_id,
                InsightType::KeyTakeaway,
                t,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.text = Some(t.clone());
            rows.push(row);
        }

        for f in &analysis.product_feedback {
            let mut row = Self::base(
                interaction_id,
                InsightType::ProductFeedback,
                &f.text,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.text = Some(f.text.clone());
            rows.push(row);
        }

        for m in &analysis.market_intelligence {
            let mut row = Self::base(
                interaction_id,
                InsightType::MarketIntelligence,
                &m.text,
                tenant_id,
                trace_id,
                interaction_type,
                account_id,
                interaction_timestamp,
            );
            row.text = Some(m.text.clone());
            rows.push(row);
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_analysis() -> InteractionAnalysis {
        InteractionAnalysis {
            summaries: Summaries {
                title: "Q3 Sync".to_string(),
                headline: "Team discussed Q3 goals.".to_string(),
                brief: "Brief paragraph.".to_string(),
                detailed: "Detailed writeup.".to_string(),
                spotlight: "Key highlight.".to_string(),
            },
            action_items: vec![ActionItem {
                description: "Ship the report".to_string(),
                owner: Some("Ada".to_string()),
                due_date: None,
            }],
            decisions: vec![],
            risks: vec![],
            key_takeaways: vec!["Budget is tight".to_string()],
            product_feedback: vec![TextNote {
                text: "Users want dark mode".to_string(),
            }],
            market_intelligence: vec![TextNote {
                text: "Competitor launched a feature".to_string(),
            }],
        }
    }

    #[test]
    fn product_feedback_and_market_intelligence_keep_their_own_type() {
        let analysis = sample_analysis();
        let rows = InteractionInsight::rows_for(
            &analysis,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "trace-1",
            InteractionType::Note,
            None,
            Utc::now(),
        );
        let feedback = rows
            .iter()
            .find(|r| r.text.as_deref() == Some("Users want dark mode"))
            .unwrap();
        assert_eq!(feedback.insight_type, InsightType::ProductFeedback);

        let market = rows
            .iter()
            .find(|r| r.text.as_deref() == Some("Competitor launched a feature"))
            .unwrap();
        assert_eq!(market.insight_type, InsightType::MarketIntelligence);
    }

    #[test]
    fn content_hash_is_deterministic_and_sensitive_to_content() {
        let a = content_hash(InsightType::KeyTakeaway, "same type different content a");
        let b = content_hash(InsightType::KeyTakeaway, "same type different content b");
        let a_again = content_hash(InsightType::KeyTakeaway, "same type different content a");
        assert_eq!(a, a_again);
        assert_ne!(a, b);
    }

    #[test]
    fn five_summary_rows_always_emitted() {
        let analysis = sample_analysis();
        let rows = InteractionSummaryEntry::five_for(
            &analysis.summaries,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "openai:gpt-4o",
            Uuid::new_v4(),
            "trace-1",
            InteractionType::Note,
            None,
            Utc::now(),
        );
        assert_eq!(rows.len(), 5);
        for level in SummaryLevel::ALL {
            assert!(rows.iter().any(|r| r.level == level));
        }
    }
}
