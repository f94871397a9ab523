//! Persisted platform event model.

use bidwork_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    /// Commit time of the mutation, as stamped on the bus.
    pub occurred_at: Timestamp,
    /// Time the log row was written; trails `occurred_at` when persistence lags.
    pub created_at: Timestamp,
}
