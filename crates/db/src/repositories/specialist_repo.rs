//! Repository for the `specialists` table.

use bidwork_core::types::DbId;
use sqlx::PgPool;

use crate::models::specialist::{CreateSpecialist, Specialist};

const COLUMNS: &str = "id, display_name, avatar_url, profession, created_at";

/// Read access to specialist profiles, plus an upsert used when the
/// identity service syncs a profile.
pub struct SpecialistRepo;

impl SpecialistRepo {
    pub async fn upsert(pool: &PgPool, input: &CreateSpecialist) -> Result<Specialist, sqlx::Error> {
        let query = format!(
            "INSERT INTO specialists (id, display_name, avatar_url, profession) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                display_name = EXCLUDED.display_name, \
                avatar_url = EXCLUDED.avatar_url, \
                profession = EXCLUDED.profession \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Specialist>(&query)
            .bind(input.id)
            .bind(&input.display_name)
            .bind(&input.avatar_url)
            .bind(&input.profession)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Specialist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM specialists WHERE id = $1");
        sqlx::query_as::<_, Specialist>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
