//! Handlers for bid requests and bid responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bidwork_core::bidding::{
    MAX_ADMIN_NOTE_LENGTH, MAX_COVER_LETTER_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_ESTIMATED_DAYS,
};
use bidwork_core::types::{DbId, Money};
use bidwork_db::models::bid::{
    AcceptedBidOutcome, BidRequest, BidRequestWithResponse, BidResponse,
};
use bidwork_lifecycle::{AcceptBid, BidRequestOutcome};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// validator length bounds must be u64
const MAX_ADMIN_NOTE_LENGTH_U64: u64 = MAX_ADMIN_NOTE_LENGTH as u64;
const MAX_COVER_LETTER_LENGTH_U64: u64 = MAX_COVER_LETTER_LENGTH as u64;
const MAX_DESCRIPTION_LENGTH_U64: u64 = MAX_DESCRIPTION_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct SendBidsRequest {
    #[validate(length(min = 1, max = 100))]
    pub specialist_ids: Vec<DbId>,
    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH_U64))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResponseRequest {
    pub proposed_price: Money,
    #[validate(range(min = 1, max = MAX_ESTIMATED_DAYS))]
    pub estimated_days: i32,
    #[validate(length(min = 1, max = MAX_COVER_LETTER_LENGTH_U64))]
    pub cover_letter: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptResponseRequest {
    /// Required; send `0` for no markup.
    pub markup_percentage: Decimal,
    #[validate(length(max = MAX_ADMIN_NOTE_LENGTH_U64))]
    pub admin_comment: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectResponseRequest {
    #[validate(length(max = MAX_ADMIN_NOTE_LENGTH_U64))]
    pub reason: Option<String>,
}

/// GET /api/v1/projects/{id}/bids
pub async fn list_for_project(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BidRequestWithResponse>>>> {
    let requests = state.marketplace.bids.list_requests(project_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/projects/{id}/bids
///
/// Returns one outcome per specialist, in request order.
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(project_id): Path<DbId>,
    Json(input): Json<SendBidsRequest>,
) -> AppResult<Json<DataResponse<Vec<BidRequestOutcome>>>> {
    input.validate()?;
    let outcomes = state
        .marketplace
        .bids
        .send_bids(
            project_id,
            &input.specialist_ids,
            input.description,
            &admin.actor(),
        )
        .await?;
    Ok(Json(DataResponse { data: outcomes }))
}

/// POST /api/v1/bid-requests/{id}/response
pub async fn submit_response(
    State(state): State<AppState>,
    user: AuthUser,
    Path(bid_request_id): Path<DbId>,
    Json(input): Json<SubmitResponseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BidResponse>>)> {
    input.validate()?;
    let response = state
        .marketplace
        .bids
        .submit_response(
            bid_request_id,
            input.proposed_price,
            input.estimated_days,
            input.cover_letter,
            &user.actor(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/bid-requests/{id}/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(bid_request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BidRequest>>> {
    let request = state
        .marketplace
        .bids
        .withdraw_request(bid_request_id, &admin.actor())
        .await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/bid-responses/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(bid_response_id): Path<DbId>,
    Json(input): Json<AcceptResponseRequest>,
) -> AppResult<Json<DataResponse<AcceptedBidOutcome>>> {
    input.validate()?;
    let outcome = state
        .marketplace
        .bids
        .accept_response(
            bid_response_id,
            AcceptBid {
                markup_percentage: input.markup_percentage,
                admin_comment: input.admin_comment,
                role: input.role,
            },
            &admin.actor(),
        )
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/bid-responses/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(bid_response_id): Path<DbId>,
    Json(input): Json<RejectResponseRequest>,
) -> AppResult<Json<DataResponse<BidResponse>>> {
    input.validate()?;
    let response = state
        .marketplace
        .bids
        .reject_response(bid_response_id, input.reason, &admin.actor())
        .await?;
    Ok(Json(DataResponse { data: response }))
}
