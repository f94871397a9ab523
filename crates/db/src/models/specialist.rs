//! Specialist profile model.

use bidwork_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `specialists` table. `id` is the specialist's user id.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Specialist {
    pub id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profession: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a specialist profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpecialist {
    pub id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profession: Option<String>,
}
