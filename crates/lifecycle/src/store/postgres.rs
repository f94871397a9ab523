//! [`MarketplaceStore`] over the `bidwork-db` repositories.

use async_trait::async_trait;
use bidwork_core::assignment::TeamMemberSource;
use bidwork_core::bidding::{
    validate_request_transition, validate_response_transition, BidRequestStatus,
    BidResponseStatus,
};
use bidwork_core::error::CoreError;
use bidwork_core::pricing::round_money;
use bidwork_core::types::{DbId, Money};
use bidwork_db::models::assignment::{Assignment, CreateAssignment};
use bidwork_db::models::bid::{
    AcceptedBid, AcceptedBidOutcome, BidAcceptance, BidRequest, BidRequestWithResponse,
    BidResponse, CreateBidRequest, CreateBidResponse,
};
use bidwork_db::models::project::{CreateProject, Project};
use bidwork_db::models::specialist::{CreateSpecialist, Specialist};
use bidwork_db::repositories::bid_request_repo::OPEN_PAIR_CONSTRAINT;
use bidwork_db::repositories::{
    AcceptOutcome, AssignmentRepo, BidRequestRepo, BidResponseRepo, ProjectRepo, RecordOutcome,
    RejectOutcome, SpecialistRepo, WithdrawOutcome,
};
use bidwork_db::DbPool;

use super::MarketplaceStore;
use crate::error::LifecycleResult;

/// Postgres-backed store. Cheap to clone; shares the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn not_found(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

#[async_trait]
impl MarketplaceStore for PgStore {
    async fn health_check(&self) -> LifecycleResult<()> {
        bidwork_db::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_project(&self, input: CreateProject) -> LifecycleResult<Project> {
        Ok(ProjectRepo::create(&self.pool, &input).await?)
    }

    async fn load_project(&self, id: DbId) -> LifecycleResult<Option<Project>> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn save_project(
        &self,
        project: &Project,
        expected_version: i32,
    ) -> LifecycleResult<Project> {
        if let Some(saved) =
            ProjectRepo::save_versioned(&self.pool, project, expected_version).await?
        {
            return Ok(saved);
        }
        // No row matched: either the project vanished or the version moved.
        match ProjectRepo::find_by_id(&self.pool, project.id).await? {
            None => Err(not_found("Project", project.id).into()),
            Some(_) => Err(CoreError::VersionConflict {
                entity: "Project",
                id: project.id,
                expected_version,
            }
            .into()),
        }
    }

    async fn upsert_specialist(&self, input: CreateSpecialist) -> LifecycleResult<Specialist> {
        Ok(SpecialistRepo::upsert(&self.pool, &input).await?)
    }

    async fn find_specialist(&self, id: DbId) -> LifecycleResult<Option<Specialist>> {
        Ok(SpecialistRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_open_bid_request(
        &self,
        project_id: DbId,
        specialist_id: DbId,
    ) -> LifecycleResult<Option<BidRequest>> {
        Ok(BidRequestRepo::find_open_for_pair(&self.pool, project_id, specialist_id).await?)
    }

    async fn insert_bid_request(&self, input: CreateBidRequest) -> LifecycleResult<BidRequest> {
        match BidRequestRepo::create(&self.pool, &input).await {
            Ok(request) => Ok(request),
            Err(e) if bidwork_db::is_unique_violation(&e, OPEN_PAIR_CONSTRAINT) => {
                Err(CoreError::DuplicateBidRequest {
                    project_id: input.project_id,
                    specialist_id: input.specialist_id,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load_bid_request(&self, id: DbId) -> LifecycleResult<Option<BidRequest>> {
        Ok(BidRequestRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_bid_requests(
        &self,
        project_id: DbId,
    ) -> LifecycleResult<Vec<BidRequestWithResponse>> {
        let requests = BidRequestRepo::list_for_project(&self.pool, project_id).await?;
        let mut responses = BidResponseRepo::list_for_project(&self.pool, project_id).await?;
        Ok(requests
            .into_iter()
            .map(|request| {
                let response = responses
                    .iter()
                    .position(|r| r.bid_request_id == request.id)
                    .map(|idx| responses.swap_remove(idx));
                BidRequestWithResponse { request, response }
            })
            .collect())
    }

    async fn withdraw_bid_request(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: &str,
    ) -> LifecycleResult<(BidRequest, Option<BidResponse>)> {
        match BidRequestRepo::withdraw(&self.pool, id, decided_by, reason).await? {
            WithdrawOutcome::NotFound => Err(not_found("BidRequest", id).into()),
            WithdrawOutcome::WrongStatus(status) => {
                validate_request_transition(id, status, BidRequestStatus::Withdrawn)?;
                unreachable_outcome("withdraw")
            }
            WithdrawOutcome::Withdrawn {
                request,
                rejected_response,
            } => Ok((request, rejected_response)),
        }
    }

    async fn record_bid_response(
        &self,
        input: CreateBidResponse,
    ) -> LifecycleResult<(BidRequest, BidResponse)> {
        match BidResponseRepo::record(&self.pool, &input).await? {
            RecordOutcome::RequestNotFound => {
                Err(not_found("BidRequest", input.bid_request_id).into())
            }
            RecordOutcome::RequestWrongStatus(status) => {
                validate_request_transition(
                    input.bid_request_id,
                    status,
                    BidRequestStatus::Responded,
                )?;
                unreachable_outcome("record")
            }
            RecordOutcome::Recorded { request, response } => Ok((request, response)),
        }
    }

    async fn load_bid_response(&self, id: DbId) -> LifecycleResult<Option<BidResponse>> {
        Ok(BidResponseRepo::find_by_id(&self.pool, id).await?)
    }

    async fn accept_bid(&self, acceptance: BidAcceptance) -> LifecycleResult<AcceptedBidOutcome> {
        let id = acceptance.bid_response_id;
        match BidResponseRepo::accept(&self.pool, &acceptance).await? {
            AcceptOutcome::ResponseNotFound => Err(not_found("BidResponse", id).into()),
            AcceptOutcome::ResponseWrongStatus(status) => {
                validate_response_transition(id, status, BidResponseStatus::Accepted)?;
                unreachable_outcome("accept")
            }
            AcceptOutcome::RequestWrongStatus {
                bid_request_id,
                status,
            } => {
                validate_request_transition(bid_request_id, status, BidRequestStatus::Accepted)?;
                unreachable_outcome("accept")
            }
            AcceptOutcome::ProjectClosed { project_id, status } => {
                Err(CoreError::ProjectClosed {
                    project_id,
                    status: status.as_str(),
                }
                .into())
            }
            AcceptOutcome::AlreadyAssigned {
                project_id,
                specialist_id,
            } => Err(CoreError::SpecialistAlreadyAssigned {
                project_id,
                specialist_id,
            }
            .into()),
            AcceptOutcome::Accepted(outcome) => Ok(outcome),
        }
    }

    async fn reject_bid(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: Option<&str>,
    ) -> LifecycleResult<(BidRequest, BidResponse)> {
        match BidResponseRepo::reject(&self.pool, id, decided_by, reason).await? {
            RejectOutcome::NotFound => Err(not_found("BidResponse", id).into()),
            RejectOutcome::WrongStatus(status) => {
                validate_response_transition(id, status, BidResponseStatus::Rejected)?;
                unreachable_outcome("reject")
            }
            RejectOutcome::Rejected { request, response } => Ok((request, response)),
        }
    }

    async fn list_accepted_bids(&self, project_id: DbId) -> LifecycleResult<Vec<AcceptedBid>> {
        Ok(BidResponseRepo::list_accepted_for_project(&self.pool, project_id).await?)
    }

    async fn sum_accepted_bid_final_prices(&self, project_id: DbId) -> LifecycleResult<Money> {
        let sum = BidResponseRepo::sum_accepted_final_prices(&self.pool, project_id).await?;
        Ok(round_money(sum))
    }

    async fn insert_assignment(&self, input: CreateAssignment) -> LifecycleResult<Assignment> {
        match AssignmentRepo::create_if_absent(&self.pool, &input).await? {
            Some(assignment) => Ok(assignment),
            None => Err(CoreError::SpecialistAlreadyAssigned {
                project_id: input.project_id,
                specialist_id: input.specialist_id,
            }
            .into()),
        }
    }

    async fn list_assignments(&self, project_id: DbId) -> LifecycleResult<Vec<Assignment>> {
        Ok(AssignmentRepo::list_for_project(&self.pool, project_id).await?)
    }

    async fn list_team(&self, project_id: DbId) -> LifecycleResult<Vec<TeamMemberSource>> {
        let rows = AssignmentRepo::list_team(&self.pool, project_id).await?;
        Ok(rows.into_iter().map(TeamMemberSource::from).collect())
    }
}

/// The repositories only report a wrong status when the transition table
/// forbids the move, so the validator above always returns an error.
fn unreachable_outcome<T>(operation: &'static str) -> LifecycleResult<T> {
    Err(CoreError::Internal(format!("Inconsistent {operation} outcome from repository")).into())
}
