//! Repository for the `bid_requests` table.

use bidwork_core::bidding::{request_successors, BidRequestStatus, BidResponseStatus};
use bidwork_core::types::DbId;
use sqlx::PgPool;

use crate::models::bid::{BidRequest, BidResponse, CreateBidRequest};

/// Column list for `bid_requests` queries.
pub(crate) const COLUMNS: &str =
    "id, project_id, specialist_id, description, status_id, created_by, created_at, updated_at";

/// Name of the partial unique index guarding open (project, specialist) pairs.
pub const OPEN_PAIR_CONSTRAINT: &str = "uq_bid_requests_open_pair";

/// Outcome of [`BidRequestRepo::withdraw`].
#[derive(Debug)]
pub enum WithdrawOutcome {
    NotFound,
    /// The request is already resolved; nothing was written.
    WrongStatus(BidRequestStatus),
    Withdrawn {
        request: BidRequest,
        /// The pending response that was closed along with the request.
        rejected_response: Option<BidResponse>,
    },
}

/// Provides operations for bid requests.
pub struct BidRequestRepo;

impl BidRequestRepo {
    /// Insert a pending bid request.
    ///
    /// Fails with a unique violation on [`OPEN_PAIR_CONSTRAINT`] when the pair
    /// already has a non-withdrawn request.
    pub async fn create(pool: &PgPool, input: &CreateBidRequest) -> Result<BidRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO bid_requests (project_id, specialist_id, description, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BidRequest>(&query)
            .bind(input.project_id)
            .bind(input.specialist_id)
            .bind(&input.description)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BidRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bid_requests WHERE id = $1");
        sqlx::query_as::<_, BidRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The non-withdrawn request for a (project, specialist) pair, if any.
    pub async fn find_open_for_pair(
        pool: &PgPool,
        project_id: DbId,
        specialist_id: DbId,
    ) -> Result<Option<BidRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bid_requests \
             WHERE project_id = $1 AND specialist_id = $2 AND status_id <> $3"
        );
        sqlx::query_as::<_, BidRequest>(&query)
            .bind(project_id)
            .bind(specialist_id)
            .bind(BidRequestStatus::Withdrawn.id())
            .fetch_optional(pool)
            .await
    }

    /// All requests for a project in creation order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<BidRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bid_requests WHERE project_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, BidRequest>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Withdraw a pending or responded request. A pending response under it
    /// is rejected with `reason` in the same transaction.
    pub async fn withdraw(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        reason: &str,
    ) -> Result<WithdrawOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock = format!("SELECT {COLUMNS} FROM bid_requests WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, BidRequest>(&lock)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(WithdrawOutcome::NotFound);
        };

        if !request_successors(current.status).contains(&BidRequestStatus::Withdrawn) {
            return Ok(WithdrawOutcome::WrongStatus(current.status));
        }

        let update = format!(
            "UPDATE bid_requests SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, BidRequest>(&update)
            .bind(id)
            .bind(BidRequestStatus::Withdrawn.id())
            .fetch_one(&mut *tx)
            .await?;

        let close_response = format!(
            "UPDATE bid_responses SET \
                status_id = $2, rejection_reason = $3, decided_by = $4, \
                decided_at = NOW(), updated_at = NOW() \
             WHERE bid_request_id = $1 AND status_id = $5 \
             RETURNING {}",
            super::bid_response_repo::COLUMNS
        );
        let rejected_response = sqlx::query_as::<_, BidResponse>(&close_response)
            .bind(id)
            .bind(BidResponseStatus::Rejected.id())
            .bind(reason)
            .bind(decided_by)
            .bind(BidResponseStatus::Pending.id())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(WithdrawOutcome::Withdrawn {
            request,
            rejected_response,
        })
    }
}
