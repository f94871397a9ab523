//! Handlers for project team and specialist assignments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bidwork_core::assignment::MAX_ROLE_LENGTH;
use bidwork_core::types::DbId;
use bidwork_db::models::assignment::Assignment;
use bidwork_lifecycle::TeamView;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// validator length bounds must be u64
const MAX_ROLE_LENGTH_U64: u64 = MAX_ROLE_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    pub specialist_id: DbId,
    #[validate(length(min = 1, max = MAX_ROLE_LENGTH_U64))]
    pub role: String,
}

/// GET /api/v1/projects/{id}/team
///
/// The same view is returned to every caller; anonymization depends only on
/// the project's management type.
pub async fn team(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TeamView>>> {
    let team = state.marketplace.assignments.team_members(id).await?;
    Ok(Json(DataResponse { data: team }))
}

/// GET /api/v1/projects/{id}/assignments
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let assignments = state.marketplace.assignments.list_assignments(id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/projects/{id}/assignments
pub async fn assign(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Assignment>>)> {
    input.validate()?;
    let assignment = state
        .marketplace
        .assignments
        .assign(id, input.specialist_id, input.role, &admin.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}
