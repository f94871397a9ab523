//! In-process [`MarketplaceStore`] used by tests and local runs.
//!
//! All state sits behind one `tokio::sync::Mutex`; every trait method takes
//! the lock once, so each multi-entity operation is a single critical
//! section.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bidwork_core::assignment::TeamMemberSource;
use bidwork_core::bidding::{
    validate_request_transition, validate_response_transition, BidRequestStatus,
    BidResponseStatus,
};
use bidwork_core::error::CoreError;
use bidwork_core::pricing::suggested_amount;
use bidwork_core::project::ProjectStatus;
use bidwork_core::types::{DbId, Money, Timestamp};
use chrono::Utc;
use tokio::sync::Mutex;

use bidwork_db::models::assignment::{Assignment, CreateAssignment};
use bidwork_db::models::bid::{
    AcceptedBid, AcceptedBidOutcome, BidAcceptance, BidRequest, BidRequestWithResponse,
    BidResponse, CreateBidRequest, CreateBidResponse,
};
use bidwork_db::models::project::{CreateProject, Project};
use bidwork_db::models::specialist::{CreateSpecialist, Specialist};

use super::MarketplaceStore;
use crate::error::LifecycleResult;

#[derive(Default)]
struct State {
    last_id: DbId,
    projects: BTreeMap<DbId, Project>,
    specialists: BTreeMap<DbId, Specialist>,
    bid_requests: BTreeMap<DbId, BidRequest>,
    bid_responses: BTreeMap<DbId, BidResponse>,
    assignments: BTreeMap<DbId, Assignment>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn open_request(&self, project_id: DbId, specialist_id: DbId) -> Option<&BidRequest> {
        self.bid_requests.values().find(|r| {
            r.project_id == project_id
                && r.specialist_id == specialist_id
                && r.status.blocks_new_request()
        })
    }

    fn response_for_request(&self, bid_request_id: DbId) -> Option<&BidResponse> {
        self.bid_responses
            .values()
            .find(|r| r.bid_request_id == bid_request_id)
    }

    fn is_assigned(&self, project_id: DbId, specialist_id: DbId) -> bool {
        self.assignments
            .values()
            .any(|a| a.project_id == project_id && a.specialist_id == specialist_id)
    }

    fn project(&self, id: DbId) -> Result<&Project, CoreError> {
        self.projects.get(&id).ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })
    }

    fn request_mut(&mut self, id: DbId) -> Result<&mut BidRequest, CoreError> {
        self.bid_requests.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "BidRequest",
            id,
        })
    }

    fn response_mut(&mut self, id: DbId) -> Result<&mut BidResponse, CoreError> {
        self.bid_responses.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "BidResponse",
            id,
        })
    }

    fn set_request_status(
        &mut self,
        id: DbId,
        status: BidRequestStatus,
        now: Timestamp,
    ) -> Result<BidRequest, CoreError> {
        let request = self.request_mut(id)?;
        request.status = status;
        request.updated_at = now;
        Ok(request.clone())
    }

    fn create_assignment(&mut self, input: &CreateAssignment, now: Timestamp) -> Assignment {
        let assignment = Assignment {
            id: self.next_id(),
            project_id: input.project_id,
            specialist_id: input.specialist_id,
            role: input.role.clone(),
            bid_response_id: input.bid_response_id,
            assigned_at: now,
        };
        self.assignments.insert(assignment.id, assignment.clone());
        assignment
    }

    fn accepted_bids(&self, project_id: DbId) -> Vec<AcceptedBid> {
        self.bid_responses
            .values()
            .filter(|r| r.status == BidResponseStatus::Accepted)
            .filter_map(|r| {
                let request = self.bid_requests.get(&r.bid_request_id)?;
                if request.project_id != project_id {
                    return None;
                }
                Some(AcceptedBid {
                    bid_request_id: request.id,
                    bid_response_id: r.id,
                    specialist_id: request.specialist_id,
                    proposed_price: r.proposed_price,
                    admin_markup_percentage: r.admin_markup_percentage?,
                    final_price: r.final_price?,
                    estimated_days: r.estimated_days,
                    accepted_at: r.decided_at.unwrap_or(r.updated_at),
                })
            })
            .collect()
    }
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a responded request and pending response directly, bypassing
    /// the open-pair check. Returns the response id.
    #[cfg(test)]
    pub(crate) async fn insert_raw_bid(
        &self,
        project_id: DbId,
        specialist_id: DbId,
        proposed_price: Money,
    ) -> DbId {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let request = BidRequest {
            id: state.next_id(),
            project_id,
            specialist_id,
            description: "fixture".into(),
            status: BidRequestStatus::Responded,
            created_by: 0,
            created_at: now,
            updated_at: now,
        };
        let response = BidResponse {
            id: state.next_id(),
            bid_request_id: request.id,
            proposed_price,
            estimated_days: 1,
            cover_letter: "fixture".into(),
            status: BidResponseStatus::Pending,
            admin_markup_percentage: None,
            final_price: None,
            admin_comment: None,
            rejection_reason: None,
            decided_by: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        };
        let response_id = response.id;
        state.bid_requests.insert(request.id, request);
        state.bid_responses.insert(response.id, response);
        response_id
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn health_check(&self) -> LifecycleResult<()> {
        Ok(())
    }

    async fn insert_project(&self, input: CreateProject) -> LifecycleResult<Project> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let project = Project {
            id: state.next_id(),
            client_id: input.client_id,
            name: input.name,
            description: input.description,
            status: ProjectStatus::QuotePending,
            management_type: input.management_type,
            quoted_amount: None,
            quote_notes: None,
            quote_submitted_at: None,
            quote_accepted_at: None,
            quote_rejected_at: None,
            quote_rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn load_project(&self, id: DbId) -> LifecycleResult<Option<Project>> {
        Ok(self.state.lock().await.projects.get(&id).cloned())
    }

    async fn save_project(
        &self,
        project: &Project,
        expected_version: i32,
    ) -> LifecycleResult<Project> {
        let mut state = self.state.lock().await;
        let stored = state
            .projects
            .get_mut(&project.id)
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project.id,
            })?;
        if stored.version != expected_version {
            return Err(CoreError::VersionConflict {
                entity: "Project",
                id: project.id,
                expected_version,
            }
            .into());
        }

        let saved = Project {
            client_id: stored.client_id,
            created_at: stored.created_at,
            version: expected_version + 1,
            updated_at: Utc::now(),
            ..project.clone()
        };
        *stored = saved.clone();
        Ok(saved)
    }

    async fn upsert_specialist(&self, input: CreateSpecialist) -> LifecycleResult<Specialist> {
        let mut state = self.state.lock().await;
        let created_at = state
            .specialists
            .get(&input.id)
            .map(|s| s.created_at)
            .unwrap_or_else(Utc::now);
        let specialist = Specialist {
            id: input.id,
            display_name: input.display_name,
            avatar_url: input.avatar_url,
            profession: input.profession,
            created_at,
        };
        state.specialists.insert(specialist.id, specialist.clone());
        Ok(specialist)
    }

    async fn find_specialist(&self, id: DbId) -> LifecycleResult<Option<Specialist>> {
        Ok(self.state.lock().await.specialists.get(&id).cloned())
    }

    async fn find_open_bid_request(
        &self,
        project_id: DbId,
        specialist_id: DbId,
    ) -> LifecycleResult<Option<BidRequest>> {
        let state = self.state.lock().await;
        Ok(state.open_request(project_id, specialist_id).cloned())
    }

    async fn insert_bid_request(&self, input: CreateBidRequest) -> LifecycleResult<BidRequest> {
        let mut state = self.state.lock().await;
        state.project(input.project_id)?;
        if !state.specialists.contains_key(&input.specialist_id) {
            return Err(CoreError::NotFound {
                entity: "Specialist",
                id: input.specialist_id,
            }
            .into());
        }
        if state
            .open_request(input.project_id, input.specialist_id)
            .is_some()
        {
            return Err(CoreError::DuplicateBidRequest {
                project_id: input.project_id,
                specialist_id: input.specialist_id,
            }
            .into());
        }

        let now = Utc::now();
        let request = BidRequest {
            id: state.next_id(),
            project_id: input.project_id,
            specialist_id: input.specialist_id,
            description: input.description,
            status: BidRequestStatus::Pending,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };
        state.bid_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn load_bid_request(&self, id: DbId) -> LifecycleResult<Option<BidRequest>> {
        Ok(self.state.lock().await.bid_requests.get(&id).cloned())
    }

    async fn list_bid_requests(
        &self,
        project_id: DbId,
    ) -> LifecycleResult<Vec<BidRequestWithResponse>> {
        let state = self.state.lock().await;
        Ok(state
            .bid_requests
            .values()
            .filter(|r| r.project_id == project_id)
            .map(|r| BidRequestWithResponse {
                request: r.clone(),
                response: state.response_for_request(r.id).cloned(),
            })
            .collect())
    }

    async fn withdraw_bid_request(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: &str,
    ) -> LifecycleResult<(BidRequest, Option<BidResponse>)> {
        let mut state = self.state.lock().await;
        let current = state.request_mut(id)?.status;
        validate_request_transition(id, current, BidRequestStatus::Withdrawn)?;

        let now = Utc::now();
        let request = state.set_request_status(id, BidRequestStatus::Withdrawn, now)?;

        let pending = state
            .response_for_request(id)
            .filter(|r| r.status == BidResponseStatus::Pending)
            .map(|r| r.id);
        let rejected_response = match pending {
            Some(response_id) => {
                let response = state.response_mut(response_id)?;
                response.status = BidResponseStatus::Rejected;
                response.rejection_reason = Some(reason.to_string());
                response.decided_by = Some(decided_by);
                response.decided_at = Some(now);
                response.updated_at = now;
                Some(response.clone())
            }
            None => None,
        };

        Ok((request, rejected_response))
    }

    async fn record_bid_response(
        &self,
        input: CreateBidResponse,
    ) -> LifecycleResult<(BidRequest, BidResponse)> {
        let mut state = self.state.lock().await;
        let current = state.request_mut(input.bid_request_id)?.status;
        validate_request_transition(
            input.bid_request_id,
            current,
            BidRequestStatus::Responded,
        )?;

        let now = Utc::now();
        let response = BidResponse {
            id: state.next_id(),
            bid_request_id: input.bid_request_id,
            proposed_price: input.proposed_price,
            estimated_days: input.estimated_days,
            cover_letter: input.cover_letter,
            status: BidResponseStatus::Pending,
            admin_markup_percentage: None,
            final_price: None,
            admin_comment: None,
            rejection_reason: None,
            decided_by: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        };
        state.bid_responses.insert(response.id, response.clone());
        let request =
            state.set_request_status(input.bid_request_id, BidRequestStatus::Responded, now)?;

        Ok((request, response))
    }

    async fn load_bid_response(&self, id: DbId) -> LifecycleResult<Option<BidResponse>> {
        Ok(self.state.lock().await.bid_responses.get(&id).cloned())
    }

    async fn accept_bid(&self, acceptance: BidAcceptance) -> LifecycleResult<AcceptedBidOutcome> {
        let mut state = self.state.lock().await;

        let response = state.response_mut(acceptance.bid_response_id)?.clone();
        validate_response_transition(response.id, response.status, BidResponseStatus::Accepted)?;

        let request = state.request_mut(response.bid_request_id)?.clone();
        validate_request_transition(request.id, request.status, BidRequestStatus::Accepted)?;

        let project_status = state.project(request.project_id)?.status;
        if project_status.is_terminal() {
            return Err(CoreError::ProjectClosed {
                project_id: request.project_id,
                status: project_status.as_str(),
            }
            .into());
        }
        if state.is_assigned(request.project_id, request.specialist_id) {
            return Err(CoreError::SpecialistAlreadyAssigned {
                project_id: request.project_id,
                specialist_id: request.specialist_id,
            }
            .into());
        }

        // Every precondition holds; nothing below can fail half-way.
        let now = Utc::now();
        let assignment = state.create_assignment(
            &CreateAssignment {
                project_id: request.project_id,
                specialist_id: request.specialist_id,
                role: acceptance.assignment.role.clone(),
                bid_response_id: Some(response.id),
            },
            now,
        );

        let stored = state.response_mut(response.id)?;
        stored.status = BidResponseStatus::Accepted;
        stored.admin_markup_percentage = Some(acceptance.markup_percentage);
        stored.final_price = Some(acceptance.final_price);
        stored.admin_comment = acceptance.admin_comment;
        stored.decided_by = Some(acceptance.decided_by);
        stored.decided_at = Some(now);
        stored.updated_at = now;
        let response = stored.clone();

        let request = state.set_request_status(request.id, BidRequestStatus::Accepted, now)?;

        Ok(AcceptedBidOutcome {
            response,
            request,
            assignment,
        })
    }

    async fn reject_bid(
        &self,
        id: DbId,
        decided_by: DbId,
        reason: Option<&str>,
    ) -> LifecycleResult<(BidRequest, BidResponse)> {
        let mut state = self.state.lock().await;

        let current = state.response_mut(id)?.clone();
        validate_response_transition(id, current.status, BidResponseStatus::Rejected)?;
        let request_status = state.request_mut(current.bid_request_id)?.status;
        validate_request_transition(
            current.bid_request_id,
            request_status,
            BidRequestStatus::Rejected,
        )?;

        let now = Utc::now();
        let stored = state.response_mut(id)?;
        stored.status = BidResponseStatus::Rejected;
        stored.rejection_reason = reason.map(str::to_string);
        stored.decided_by = Some(decided_by);
        stored.decided_at = Some(now);
        stored.updated_at = now;
        let response = stored.clone();

        let request =
            state.set_request_status(current.bid_request_id, BidRequestStatus::Rejected, now)?;
        Ok((request, response))
    }

    async fn list_accepted_bids(&self, project_id: DbId) -> LifecycleResult<Vec<AcceptedBid>> {
        Ok(self.state.lock().await.accepted_bids(project_id))
    }

    async fn sum_accepted_bid_final_prices(&self, project_id: DbId) -> LifecycleResult<Money> {
        let state = self.state.lock().await;
        Ok(suggested_amount(
            state
                .accepted_bids(project_id)
                .into_iter()
                .map(|b| b.final_price),
        ))
    }

    async fn insert_assignment(&self, input: CreateAssignment) -> LifecycleResult<Assignment> {
        let mut state = self.state.lock().await;
        state.project(input.project_id)?;
        if !state.specialists.contains_key(&input.specialist_id) {
            return Err(CoreError::NotFound {
                entity: "Specialist",
                id: input.specialist_id,
            }
            .into());
        }
        if state.is_assigned(input.project_id, input.specialist_id) {
            return Err(CoreError::SpecialistAlreadyAssigned {
                project_id: input.project_id,
                specialist_id: input.specialist_id,
            }
            .into());
        }
        Ok(state.create_assignment(&input, Utc::now()))
    }

    async fn list_assignments(&self, project_id: DbId) -> LifecycleResult<Vec<Assignment>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_team(&self, project_id: DbId) -> LifecycleResult<Vec<TeamMemberSource>> {
        let state = self.state.lock().await;
        Ok(state
            .assignments
            .values()
            .filter(|a| a.project_id == project_id)
            .filter_map(|a| {
                let specialist = state.specialists.get(&a.specialist_id)?;
                Some(TeamMemberSource {
                    assignment_id: a.id,
                    specialist_id: a.specialist_id,
                    display_name: specialist.display_name.clone(),
                    avatar_url: specialist.avatar_url.clone(),
                    profession: specialist.profession.clone(),
                    role: a.role.clone(),
                    assigned_at: a.assigned_at,
                })
            })
            .collect())
    }
}
