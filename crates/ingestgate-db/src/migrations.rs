//! Versioned schema migrations, applied at startup: a static list of
//! `(version, description, sql)` tuples tracked in a `schema_migrations`
//! table so each applies exactly once.
//!
//! Enum-shaped columns (`status`, `job_type`, insight `type`, `severity`,
//! summary `level`) are `TEXT` with a `CHECK` constraint rather than a
//! native Postgres `ENUM`, so adding a new variant is a migration instead
//! of an `ALTER TYPE`.

use ingestgate_core::error::{Error, Result};
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create upload_jobs table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS upload_jobs (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL,
                user_id TEXT NOT NULL,
                pg_user_id TEXT,
                user_name TEXT,
                job_type TEXT NOT NULL CHECK (job_type IN ('audio_transcription', 'text_processing')),
                status TEXT NOT NULL CHECK (status IN ('queued', 'processing', 'succeeded', 'failed')),
                file_key TEXT NOT NULL,
                file_name TEXT,
                mime_type TEXT,
                file_size BIGINT,
                interaction_id UUID NOT NULL,
                trace_id TEXT,
                account_id TEXT,
                error_message TEXT,
                error_code TEXT,
                result_summary TEXT,
                metadata_json JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                started_at TIMESTAMPTZ,
                completed_at TIMESTAMPTZ,
                UNIQUE (tenant_id, file_key)
            )
        "#,
    },
    Migration {
        version: 2,
        description: "Create upload_jobs indexes",
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_upload_jobs_tenant ON upload_jobs(tenant_id);
            CREATE INDEX IF NOT EXISTS idx_upload_jobs_status ON upload_jobs(status);
            CREATE INDEX IF NOT EXISTS idx_upload_jobs_tenant_status ON upload_jobs(tenant_id, status)
        "#,
    },
    Migration {
        version: 3,
        description: "Create personas table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS personas (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            )
        "#,
    },
    Migration {
        version: 4,
        description: "Seed default gtm persona",
        up_sql: r#"
            INSERT INTO personas (code, name)
            VALUES ('gtm', 'Go-to-Market')
            ON CONFLICT (code) DO NOTHING
        "#,
    },
    Migration {
        version: 5,
        description: "Create interaction_summary_entries table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS interaction_summary_entries (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                interaction_id UUID NOT NULL,
                persona_id UUID NOT NULL REFERENCES personas(id),
                level TEXT NOT NULL CHECK (level IN ('title', 'headline', 'brief', 'detailed', 'spotlight')),
                text TEXT NOT NULL,
                word_count INTEGER NOT NULL,
                profile_type TEXT NOT NULL DEFAULT 'rich',
                source TEXT NOT NULL,
                tenant_id UUID NOT NULL,
                trace_id TEXT NOT NULL,
                interaction_type TEXT NOT NULL,
                account_id TEXT,
                interaction_timestamp TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (interaction_id, persona_id, level)
            )
        "#,
    },
    Migration {
        version: 6,
        description: "Create interaction_summary_entries indexes",
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_summary_entries_interaction
            ON interaction_summary_entries(interaction_id);
            CREATE INDEX IF NOT EXISTS idx_summary_entries_tenant
            ON interaction_summary_entries(tenant_id)
        "#,
    },
    Migration {
        version: 7,
        description: "Create interaction_insights table",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS interaction_insights (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                interaction_id UUID NOT NULL,
                type TEXT NOT NULL CHECK (type IN (
                    'action_item', 'key_takeaway', 'decision_made', 'risk',
                    'product_feedback', 'market_intelligence', 'unknown'
                )),
                content_hash TEXT NOT NULL,
                tenant_id UUID NOT NULL,
                trace_id TEXT NOT NULL,
                interaction_type TEXT NOT NULL,
                account_id TEXT,
                interaction_timestamp TIMESTAMPTZ NOT NULL,

                description TEXT,
                owner TEXT,
                due_date TIMESTAMPTZ,
                decision TEXT,
                rationale TEXT,
                risk TEXT,
                severity TEXT CHECK (severity IN ('low', 'medium', 'high')),
                mitigation TEXT,
                text TEXT,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    },
    Migration {
        version: 8,
        description: "Create interaction_insights indexes",
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_insights_interaction ON interaction_insights(interaction_id);
            CREATE INDEX IF NOT EXISTS idx_insights_tenant ON interaction_insights(tenant_id);
            CREATE INDEX IF NOT EXISTS idx_insights_content_hash ON interaction_insights(content_hash)
        "#,
    },
];

async fn ensure_migrations_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database(format!("failed to create schema_migrations table: {e}")))?;
    Ok(())
}

pub async fn get_current_version(pool: &PgPool) -> Result<Option<i32>> {
    ensure_migrations_table(pool).await?;
    let version: Option<i32> = sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Database(format!("failed to read schema version: {e}")))?;
    Ok(version)
}

/// Apply every migration with `version` greater than the current schema
/// version, in order, each inside its own transaction.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    ensure_migrations_table(pool).await?;
    let current = get_current_version(pool).await?.unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(version = migration.version, description = migration.description, "applying migration");
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| Error::Database(format!("failed to begin migration transaction: {e}")))?;

        sqlx::raw_sql(migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(format!("migration {} failed: {e}", migration.version)))?;

        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(format!("failed to record migration {}: {e}", migration.version)))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(format!("failed to commit migration {}: {e}", migration.version)))?;
    }

    Ok(())
}
