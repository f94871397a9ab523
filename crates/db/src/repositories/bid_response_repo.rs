//! Repository for the `bid_responses` table.
//!
//! Recording, accepting and rejecting a response each touch the parent
//! request as well, so they run in one transaction that locks the row being
//! decided with `SELECT ... FOR UPDATE`.

use bidwork_core::bidding::{BidRequestStatus, BidResponseStatus};
use bidwork_core::project::ProjectStatus;
use bidwork_core::status::StatusId;
use bidwork_core::types::{DbId, Money};
use sqlx::PgPool;

use crate::models::assignment::Assignment;
use crate::models::bid::{
    AcceptedBid, AcceptedBidOutcome, BidAcceptance, BidRequest, BidResponse, CreateBidResponse,
};

/// Column list for `bid_responses` queries.
pub(crate) const COLUMNS: &str = "\
    id, bid_request_id, proposed_price, estimated_days, cover_letter, status_id, \
    admin_markup_percentage, final_price, admin_comment, rejection_reason, \
    decided_by, decided_at, created_at, updated_at";

/// Outcome of [`BidResponseRepo::record`].
#[derive(Debug)]
pub enum RecordOutcome {
    RequestNotFound,
    RequestWrongStatus(BidRequestStatus),
    Recorded {
        request: BidRequest,
        response: BidResponse,
    },
}

/// Outcome of [`BidResponseRepo::accept`]. Every variant except `Accepted`
/// means the transaction was rolled back.
#[derive(Debug)]
pub enum AcceptOutcome {
    ResponseNotFound,
    ResponseWrongStatus(BidResponseStatus),
    RequestWrongStatus {
        bid_request_id: DbId,
        status: BidRequestStatus,
    },
    ProjectClosed {
        project_id: DbId,
        status: ProjectStatus,
    },
    AlreadyAssigned {
        project_id: DbId,
        specialist_id: DbId,
    },
    Accepted(AcceptedBidOutcome),
}

/// Outcome of [`BidResponseRepo::reject`].
#[derive(Debug)]
pub enum RejectOutcome {
    NotFound,
    WrongStatus(BidResponseStatus),
    Rejected {
        request: BidRequest,
        response: BidResponse,
    },
}

/// Provides operations for bid responses.
pub struct BidResponseRepo;

impl BidResponseRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BidResponse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bid_responses WHERE id = $1");
        sqlx::query_as::<_, BidResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All responses submitted against a project's requests.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<BidResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bid_responses \
             WHERE bid_request_id IN (SELECT id FROM bid_requests WHERE project_id = $1) \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, BidResponse>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a pending response and advance its request to `responded`.
    pub async fn record(
        pool: &PgPool,
        input: &CreateBidResponse,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock = format!(
            "SELECT {} FROM bid_requests WHERE id = $1 FOR UPDATE",
            super::bid_request_repo::COLUMNS
        );
        let Some(current) = sqlx::query_as::<_, BidRequest>(&lock)
            .bind(input.bid_request_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(RecordOutcome::RequestNotFound);
        };
        if current.status != BidRequestStatus::Pending {
            return Ok(RecordOutcome::RequestWrongStatus(current.status));
        }

        let insert = format!(
            "INSERT INTO bid_responses (bid_request_id, proposed_price, estimated_days, cover_letter) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let response = sqlx::query_as::<_, BidResponse>(&insert)
            .bind(input.bid_request_id)
            .bind(input.proposed_price)
            .bind(input.estimated_days)
            .bind(&input.cover_letter)
            .fetch_one(&mut *tx)
            .await?;

        let request = set_request_status(&mut tx, current.id, BidRequestStatus::Responded).await?;

        tx.commit().await?;
        Ok(RecordOutcome::Recorded { request, response })
    }

    /// Accept a pending response, freeze its final price, advance the
    /// request, and create the specialist assignment in one transaction.
    pub async fn accept(
        pool: &PgPool,
        acceptance: &BidAcceptance,
    ) -> Result<AcceptOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock = format!("SELECT {COLUMNS} FROM bid_responses WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, BidResponse>(&lock)
            .bind(acceptance.bid_response_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(AcceptOutcome::ResponseNotFound);
        };
        if current.status != BidResponseStatus::Pending {
            return Ok(AcceptOutcome::ResponseWrongStatus(current.status));
        }

        let lock_request = format!(
            "SELECT {} FROM bid_requests WHERE id = $1 FOR UPDATE",
            super::bid_request_repo::COLUMNS
        );
        let request = sqlx::query_as::<_, BidRequest>(&lock_request)
            .bind(current.bid_request_id)
            .fetch_one(&mut *tx)
            .await?;
        if request.status != BidRequestStatus::Responded {
            return Ok(AcceptOutcome::RequestWrongStatus {
                bid_request_id: request.id,
                status: request.status,
            });
        }

        let project_status_id: StatusId =
            sqlx::query_scalar("SELECT status_id FROM projects WHERE id = $1 FOR SHARE")
                .bind(request.project_id)
                .fetch_one(&mut *tx)
                .await?;
        let project_status = ProjectStatus::from_id(project_status_id)
            .map_err(crate::models::decode_error)?;
        if project_status.is_terminal() {
            return Ok(AcceptOutcome::ProjectClosed {
                project_id: request.project_id,
                status: project_status,
            });
        }

        let assign = format!(
            "INSERT INTO project_assignments (project_id, specialist_id, role, bid_response_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (project_id, specialist_id) DO NOTHING \
             RETURNING {}",
            super::assignment_repo::COLUMNS
        );
        let Some(assignment) = sqlx::query_as::<_, Assignment>(&assign)
            .bind(request.project_id)
            .bind(request.specialist_id)
            .bind(&acceptance.assignment.role)
            .bind(current.id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            // Dropping `tx` rolls back; nothing has been written yet.
            return Ok(AcceptOutcome::AlreadyAssigned {
                project_id: request.project_id,
                specialist_id: request.specialist_id,
            });
        };

        let update = format!(
            "UPDATE bid_responses SET \
                status_id = $2, admin_markup_percentage = $3, final_price = $4, \
                admin_comment = $5, decided_by = $6, decided_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let response = sqlx::query_as::<_, BidResponse>(&update)
            .bind(current.id)
            .bind(BidResponseStatus::Accepted.id())
            .bind(acceptance.markup_percentage)
            .bind(acceptance.final_price)
            .bind(&acceptance.admin_comment)
            .bind(acceptance.decided_by)
            .fetch_one(&mut *tx)
            .await?;

        let request = set_request_status(&mut tx, request.id, BidRequestStatus::Accepted).await?;

        tx.commit().await?;
        Ok(AcceptOutcome::Accepted(AcceptedBidOutcome {
            response,
            request,
            assignment,
        }))
    }

    /// Reject a pending response and its request.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        reason: Option<&str>,
    ) -> Result<RejectOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock = format!("SELECT {COLUMNS} FROM bid_responses WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, BidResponse>(&lock)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(RejectOutcome::NotFound);
        };
        if current.status != BidResponseStatus::Pending {
            return Ok(RejectOutcome::WrongStatus(current.status));
        }

        let update = format!(
            "UPDATE bid_responses SET \
                status_id = $2, rejection_reason = $3, decided_by = $4, \
                decided_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let response = sqlx::query_as::<_, BidResponse>(&update)
            .bind(id)
            .bind(BidResponseStatus::Rejected.id())
            .bind(reason)
            .bind(decided_by)
            .fetch_one(&mut *tx)
            .await?;

        let request =
            set_request_status(&mut tx, current.bid_request_id, BidRequestStatus::Rejected).await?;

        tx.commit().await?;
        Ok(RejectOutcome::Rejected { request, response })
    }

    /// Accepted bids for a project, in acceptance order.
    pub async fn list_accepted_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<AcceptedBid>, sqlx::Error> {
        sqlx::query_as::<_, AcceptedBid>(
            "SELECT q.id AS bid_request_id, r.id AS bid_response_id, q.specialist_id, \
                    r.proposed_price, r.admin_markup_percentage, r.final_price, \
                    r.estimated_days, COALESCE(r.decided_at, r.updated_at) AS accepted_at \
             FROM bid_responses r \
             JOIN bid_requests q ON q.id = r.bid_request_id \
             WHERE q.project_id = $1 AND r.status_id = $2 \
             ORDER BY accepted_at, r.id",
        )
        .bind(project_id)
        .bind(BidResponseStatus::Accepted.id())
        .fetch_all(pool)
        .await
    }

    /// Sum of the frozen final prices of a project's accepted bids.
    pub async fn sum_accepted_final_prices(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Money, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(r.final_price), 0) \
             FROM bid_responses r \
             JOIN bid_requests q ON q.id = r.bid_request_id \
             WHERE q.project_id = $1 AND r.status_id = $2",
        )
        .bind(project_id)
        .bind(BidResponseStatus::Accepted.id())
        .fetch_one(pool)
        .await
    }
}

async fn set_request_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
    status: BidRequestStatus,
) -> Result<BidRequest, sqlx::Error> {
    let query = format!(
        "UPDATE bid_requests SET status_id = $2, updated_at = NOW() \
         WHERE id = $1 RETURNING {}",
        super::bid_request_repo::COLUMNS
    );
    sqlx::query_as::<_, BidRequest>(&query)
        .bind(id)
        .bind(status.id())
        .fetch_one(&mut **tx)
        .await
}
