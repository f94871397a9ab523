//! Handlers for a project's quote.

use axum::extract::{Path, State};
use axum::Json;
use bidwork_core::quote::{MAX_QUOTE_NOTES_LENGTH, MAX_REJECTION_REASON_LENGTH};
use bidwork_core::types::{DbId, Money};
use bidwork_db::models::project::Project;
use bidwork_lifecycle::QuoteData;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::state::AppState;

// validator length bounds must be u64
const MAX_QUOTE_NOTES_LENGTH_U64: u64 = MAX_QUOTE_NOTES_LENGTH as u64;
const MAX_REJECTION_REASON_LENGTH_U64: u64 = MAX_REJECTION_REASON_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteRequest {
    pub quoted_amount: Money,
    #[validate(length(max = MAX_QUOTE_NOTES_LENGTH_U64))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectQuoteRequest {
    #[validate(length(max = MAX_REJECTION_REASON_LENGTH_U64))]
    pub reason: Option<String>,
}

/// GET /api/v1/projects/{id}/quote
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuoteData>>> {
    let data = state
        .marketplace
        .quotes
        .get_quote_data(project_id, &user.actor())
        .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/quote
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<QuoteRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    input.validate()?;
    let project = state
        .marketplace
        .quotes
        .submit_quote(project_id, input.quoted_amount, input.notes, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/quote
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<QuoteRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    input.validate()?;
    let project = state
        .marketplace
        .quotes
        .update_quote(project_id, input.quoted_amount, input.notes, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/quote/accept
pub async fn accept(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .marketplace
        .quotes
        .accept_quote(project_id, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/v1/projects/{id}/quote/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
    Path(project_id): Path<DbId>,
    Json(input): Json<RejectQuoteRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    input.validate()?;
    let project = state
        .marketplace
        .quotes
        .reject_quote(project_id, input.reason, &user.actor())
        .await?;
    Ok(Json(DataResponse { data: project }))
}
