//! Specialist-to-project assignment model.

use bidwork_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_assignments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub project_id: DbId,
    pub specialist_id: DbId,
    pub role: String,
    /// The accepted bid response that produced this assignment, if any.
    pub bid_response_id: Option<DbId>,
    pub assigned_at: Timestamp,
}

/// DTO for inserting an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub project_id: DbId,
    pub specialist_id: DbId,
    pub role: String,
    pub bid_response_id: Option<DbId>,
}

/// An assignment joined with the specialist profile, before the visibility
/// policy is applied.
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberRow {
    pub assignment_id: DbId,
    pub specialist_id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profession: Option<String>,
    pub role: String,
    pub assigned_at: Timestamp,
}

impl From<TeamMemberRow> for bidwork_core::assignment::TeamMemberSource {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            assignment_id: row.assignment_id,
            specialist_id: row.specialist_id,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            profession: row.profession,
            role: row.role,
            assigned_at: row.assigned_at,
        }
    }
}
