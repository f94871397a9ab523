//! Persistence seam for the lifecycle services.
//!
//! [`MarketplaceStore`] owns every read and write the services perform. The
//! multi-entity mutations (`record_bid_response`, `accept_bid`,
//! `withdraw_bid_request`, `reject_bid`, `insert_assignment`) re-check their
//! preconditions atomically with the write, so a concurrent caller can never
//! observe or produce a half-applied change.
//!
//! Two adapters ship with the crate: [`MemoryStore`] (one mutex over all
//! state) and [`PgStore`] (transactions over the `bidwork-db`
//! repositories).

use async_trait::async_trait;
use bidwork_core::assignment::TeamMemberSource;
use bidwork_core::types::{DbId, Money};
use bidwork_db::models::assignment::{Assignment, CreateAssignment};
use bidwork_db::models::bid::{
    AcceptedBid, AcceptedBidOutcome, BidAcceptance, BidRequest, BidRequestWithResponse,
    BidResponse, CreateBidRequest, CreateBidResponse,
};
use bidwork_db::models::project::{CreateProject, Project};
use bidwork_db::models::specialist::{CreateSpecialist, Specialist};

use crate::error::LifecycleResult;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    async fn health_check(&self) -> LifecycleResult<()>;

    // -- projects -----------------------------------------------------------

    async fn insert_project(&self, input: CreateProject) -> LifecycleResult<Project>;

    async fn load_project(&self, id: DbId) -> LifecycleResult<Option<Project>>;

    /// Persist `project` if the stored copy is still at `expected_version`.
    ///
    /// Fails with `VersionConflict` when another writer saved first and with
    /// `NotFound` when the project does not exist.
    async fn save_project(&self, project: &Project, expected_version: i32)
        -> LifecycleResult<Project>;

    // -- specialists --------------------------------------------------------

    async fn upsert_specialist(&self, input: CreateSpecialist) -> LifecycleResult<Specialist>;

    async fn find_specialist(&self, id: DbId) -> LifecycleResult<Option<Specialist>>;

    // -- bid requests -------------------------------------------------------

    /// The non-withdrawn request for the pair, if any.
    async fn find_open_bid_request(
        &self,
        project_id: DbId,
        specialist_id: DbId,
    ) -> LifecycleResult<Option<BidRequest>>;

    /// Insert a pending request. Fails with `DuplicateBidRequest` when the
    /// pair already has a non-withdrawn request.
    async fn insert_bid_request(&self, input: CreateBidRequest) -> LifecycleResult<BidRequest>;

    async fn load_bid_request(&self, id: DbId) -> LifecycleResult<Option<BidRequest>>;

    async fn list_bid_requests(&self, project_id: DbId)
        -> LifecycleResult<Vec<BidRequestWithResponse>>;

    /// Withdraw a pending or responded request, rejecting a pending response
    /// under it with `reason`.
    async fn withdraw_bid_request(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: &str,
    ) -> LifecycleResult<(BidRequest, Option<BidResponse>)>;

    // -- bid responses ------------------------------------------------------

    /// Insert a pending response and advance its request to `responded`.
    async fn record_bid_response(
        &self,
        input: CreateBidResponse,
    ) -> LifecycleResult<(BidRequest, BidResponse)>;

    async fn load_bid_response(&self, id: DbId) -> LifecycleResult<Option<BidResponse>>;

    /// Accept a pending response and create its assignment as one unit.
    ///
    /// Fails without writing anything with `InvalidBidStatus`,
    /// `ProjectClosed` or `SpecialistAlreadyAssigned`.
    async fn accept_bid(&self, acceptance: BidAcceptance) -> LifecycleResult<AcceptedBidOutcome>;

    async fn reject_bid(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: Option<&str>,
    ) -> LifecycleResult<(BidRequest, BidResponse)>;

    async fn list_accepted_bids(&self, project_id: DbId) -> LifecycleResult<Vec<AcceptedBid>>;

    async fn sum_accepted_bid_final_prices(&self, project_id: DbId) -> LifecycleResult<Money>;

    // -- assignments --------------------------------------------------------

    /// Check-and-insert. Fails with `SpecialistAlreadyAssigned` for a
    /// duplicate (project, specialist) pair.
    async fn insert_assignment(&self, input: CreateAssignment) -> LifecycleResult<Assignment>;

    async fn list_assignments(&self, project_id: DbId) -> LifecycleResult<Vec<Assignment>>;

    /// Assignments joined with specialist profiles, in assignment order.
    async fn list_team(&self, project_id: DbId) -> LifecycleResult<Vec<TeamMemberSource>>;
}
