//! §4.6.2 persona lookup: `persona_id = SELECT personas.id WHERE code = persona_code`.
//! A missing code aborts the whole persist transaction with `PERSONA_UNKNOWN`.

use ingestgate_core::error::{Error, Result};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PersonaRepository {
    pool: PgPool,
}

impl PersonaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_id_by_code(&self, code: &str) -> Result<Uuid> {
        let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM personas WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("failed to look up persona: {e}")))?;
        id.ok_or_else(|| Error::PersonaUnknown(code.to_string()))
    }
}
