//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bidwork_core::project::{
    ManagementType, ProjectStatus, MAX_PROJECT_DESCRIPTION_LENGTH, MAX_PROJECT_NAME_LENGTH,
};
use bidwork_core::types::DbId;
use bidwork_db::models::project::Project;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::state::AppState;

// validator length bounds must be u64
const MAX_PROJECT_DESCRIPTION_LENGTH_U64: u64 = MAX_PROJECT_DESCRIPTION_LENGTH as u64;
const MAX_PROJECT_NAME_LENGTH_U64: u64 = MAX_PROJECT_NAME_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = MAX_PROJECT_NAME_LENGTH_U64))]
    pub name: String,
    #[validate(length(max = MAX_PROJECT_DESCRIPTION_LENGTH_U64))]
    pub description: Option<String>,
    pub management_type: ManagementType,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Deserialize)]
pub struct ManagementTypeRequest {
    pub management_type: ManagementType,
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    input.validate()?;
    let project = state
        .marketplace
        .projects
        .create_project(
            user.user_id,
            input.name,
            input.description,
            input.management_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.marketplace.projects.get_project(id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/transition
pub async fn transition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .marketplace
        .projects
        .transition(id, input.status, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/management-type
pub async fn set_management_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ManagementTypeRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .marketplace
        .projects
        .set_management_type(id, input.management_type, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}
