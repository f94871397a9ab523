//! Project entity model and DTOs.

use bidwork_core::project::{ManagementType, ProjectStatus};
use bidwork_core::status::StatusId;
use bidwork_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::decode_error;

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub management_type: ManagementType,
    pub quoted_amount: Option<Money>,
    pub quote_notes: Option<String>,
    pub quote_submitted_at: Option<Timestamp>,
    pub quote_accepted_at: Option<Timestamp>,
    pub quote_rejected_at: Option<Timestamp>,
    pub quote_rejection_reason: Option<String>,
    /// Optimistic concurrency counter, bumped on every save.
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.client_id == user_id
    }
}

impl<'r> FromRow<'r, PgRow> for Project {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_id: StatusId = row.try_get("status_id")?;
        let management: String = row.try_get("management_type")?;
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: ProjectStatus::from_id(status_id).map_err(decode_error)?,
            management_type: ManagementType::from_str_db(&management).map_err(decode_error)?,
            quoted_amount: row.try_get("quoted_amount")?,
            quote_notes: row.try_get("quote_notes")?,
            quote_submitted_at: row.try_get("quote_submitted_at")?,
            quote_accepted_at: row.try_get("quote_accepted_at")?,
            quote_rejected_at: row.try_get("quote_rejected_at")?,
            quote_rejection_reason: row.try_get("quote_rejection_reason")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// DTO for creating a new project. New projects always start in
/// `quote_pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub client_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub management_type: ManagementType,
}
