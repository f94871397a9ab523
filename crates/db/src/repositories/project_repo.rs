//! Repository for the `projects` table.

use bidwork_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

/// Column list for `projects` queries.
const COLUMNS: &str = "\
    id, client_id, name, description, status_id, management_type, \
    quoted_amount, quote_notes, quote_submitted_at, quote_accepted_at, \
    quote_rejected_at, quote_rejection_reason, version, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `quote_pending` (the column default).
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (client_id, name, description, management_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.management_type.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a project by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write every mutable column of `project` if the stored row is still at
    /// `expected_version`. The version is bumped and `updated_at` refreshed.
    ///
    /// Returns `None` when the row is missing or another writer got there
    /// first.
    pub async fn save_versioned(
        pool: &PgPool,
        project: &Project,
        expected_version: i32,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                name = $2, \
                description = $3, \
                status_id = $4, \
                management_type = $5, \
                quoted_amount = $6, \
                quote_notes = $7, \
                quote_submitted_at = $8, \
                quote_accepted_at = $9, \
                quote_rejected_at = $10, \
                quote_rejection_reason = $11, \
                version = version + 1, \
                updated_at = NOW() \
             WHERE id = $1 AND version = $12 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.status.id())
            .bind(project.management_type.as_str())
            .bind(project.quoted_amount)
            .bind(&project.quote_notes)
            .bind(project.quote_submitted_at)
            .bind(project.quote_accepted_at)
            .bind(project.quote_rejected_at)
            .bind(&project.quote_rejection_reason)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }
}
