//! Repository for the `project_assignments` table.

use bidwork_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{Assignment, CreateAssignment, TeamMemberRow};

/// Column list for `project_assignments` queries.
pub(crate) const COLUMNS: &str =
    "id, project_id, specialist_id, role, bid_response_id, assigned_at";

/// Provides operations for specialist assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert an assignment unless the specialist is already on the project.
    ///
    /// Returns `None` when the `(project_id, specialist_id)` pair exists; the
    /// check and the insert are a single statement.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateAssignment,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_assignments (project_id, specialist_id, role, bid_response_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (project_id, specialist_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(input.project_id)
            .bind(input.specialist_id)
            .bind(&input.role)
            .bind(input.bid_response_id)
            .fetch_optional(pool)
            .await
    }

    /// List assignments for a project in assignment order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_assignments \
             WHERE project_id = $1 ORDER BY assigned_at, id"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Assignments joined with specialist profiles, in assignment order.
    pub async fn list_team(pool: &PgPool, project_id: DbId) -> Result<Vec<TeamMemberRow>, sqlx::Error> {
        sqlx::query_as::<_, TeamMemberRow>(
            "SELECT a.id AS assignment_id, a.specialist_id, s.display_name, s.avatar_url, \
                    s.profession, a.role, a.assigned_at \
             FROM project_assignments a \
             JOIN specialists s ON s.id = a.specialist_id \
             WHERE a.project_id = $1 \
             ORDER BY a.assigned_at, a.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
