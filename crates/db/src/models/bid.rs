//! Bid request and bid response models.

use bidwork_core::bidding::{BidRequestStatus, BidResponseStatus};
use bidwork_core::status::StatusId;
use bidwork_core::types::{DbId, Money, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use super::assignment::{Assignment, CreateAssignment};
use super::decode_error;

// ---------------------------------------------------------------------------
// Bid requests
// ---------------------------------------------------------------------------

/// A row from the `bid_requests` table: one invitation to one specialist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidRequest {
    pub id: DbId,
    pub project_id: DbId,
    pub specialist_id: DbId,
    pub description: String,
    pub status: BidRequestStatus,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for BidRequest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_id: StatusId = row.try_get("status_id")?;
        Ok(Self {
            id: row.try_get("id")?,
            project_id: row.try_get("project_id")?,
            specialist_id: row.try_get("specialist_id")?,
            description: row.try_get("description")?,
            status: BidRequestStatus::from_id(status_id).map_err(decode_error)?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// DTO for inserting a bid request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBidRequest {
    pub project_id: DbId,
    pub specialist_id: DbId,
    pub description: String,
    pub created_by: DbId,
}

// ---------------------------------------------------------------------------
// Bid responses
// ---------------------------------------------------------------------------

/// A row from the `bid_responses` table: a specialist's priced proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidResponse {
    pub id: DbId,
    pub bid_request_id: DbId,
    pub proposed_price: Money,
    pub estimated_days: i32,
    pub cover_letter: String,
    pub status: BidResponseStatus,
    /// Set only on acceptance.
    pub admin_markup_percentage: Option<Decimal>,
    /// Set only on acceptance.
    pub final_price: Option<Money>,
    pub admin_comment: Option<String>,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for BidResponse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_id: StatusId = row.try_get("status_id")?;
        Ok(Self {
            id: row.try_get("id")?,
            bid_request_id: row.try_get("bid_request_id")?,
            proposed_price: row.try_get("proposed_price")?,
            estimated_days: row.try_get("estimated_days")?,
            cover_letter: row.try_get("cover_letter")?,
            status: BidResponseStatus::from_id(status_id).map_err(decode_error)?,
            admin_markup_percentage: row.try_get("admin_markup_percentage")?,
            final_price: row.try_get("final_price")?,
            admin_comment: row.try_get("admin_comment")?,
            rejection_reason: row.try_get("rejection_reason")?,
            decided_by: row.try_get("decided_by")?,
            decided_at: row.try_get("decided_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// DTO for a specialist's proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBidResponse {
    pub bid_request_id: DbId,
    pub proposed_price: Money,
    pub estimated_days: i32,
    pub cover_letter: String,
}

/// Everything written when an admin accepts a response. The assignment is
/// part of the same atomic unit.
#[derive(Debug, Clone)]
pub struct BidAcceptance {
    pub bid_response_id: DbId,
    pub markup_percentage: Decimal,
    pub final_price: Money,
    pub admin_comment: Option<String>,
    pub decided_by: DbId,
    pub assignment: CreateAssignment,
}

/// Result of a committed acceptance.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedBidOutcome {
    pub response: BidResponse,
    pub request: BidRequest,
    pub assignment: Assignment,
}

/// A request together with its response, if one was submitted.
#[derive(Debug, Clone, Serialize)]
pub struct BidRequestWithResponse {
    #[serde(flatten)]
    pub request: BidRequest,
    pub response: Option<BidResponse>,
}

/// Summary of an accepted bid used when building a quote.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AcceptedBid {
    pub bid_request_id: DbId,
    pub bid_response_id: DbId,
    pub specialist_id: DbId,
    pub proposed_price: Money,
    pub admin_markup_percentage: Decimal,
    pub final_price: Money,
    pub estimated_days: i32,
    pub accepted_at: Timestamp,
}
