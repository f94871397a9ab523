//! Bid Lifecycle Manager: invitations, proposals, and admin decisions.
//!
//! Acceptance prices the bid, prepares the specialist assignment, and hands
//! both to the store as one atomic unit.

use std::sync::Arc;

use bidwork_core::bidding::{
    validate_admin_note, validate_bid_description, validate_response_input, SkipReason,
    WITHDRAWN_REJECTION_REASON,
};
use bidwork_core::error::CoreError;
use bidwork_core::pricing::{final_price, validate_markup};
use bidwork_core::roles::{Actor, ActorRole};
use bidwork_core::types::{DbId, Money};
use bidwork_core::validation::normalize_optional_text;
use bidwork_db::models::bid::{
    AcceptedBidOutcome, BidAcceptance, BidRequest, BidRequestWithResponse, BidResponse,
    CreateBidRequest, CreateBidResponse,
};
use bidwork_events::{kinds, PlatformEvent};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::assignments::{assigned_event, AssignmentCoordinator};
use crate::error::{LifecycleError, LifecycleResult};
use crate::notifier::Notifier;
use crate::projects::{load_project, require_open};
use crate::store::MarketplaceStore;

/// Per-specialist result of [`BidLifecycle::send_bids`], in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BidRequestOutcome {
    Sent {
        specialist_id: DbId,
        bid_request: BidRequest,
    },
    Skipped {
        specialist_id: DbId,
        skipped: SkipReason,
    },
}

impl BidRequestOutcome {
    pub fn specialist_id(&self) -> DbId {
        match self {
            BidRequestOutcome::Sent { specialist_id, .. }
            | BidRequestOutcome::Skipped { specialist_id, .. } => *specialist_id,
        }
    }
}

/// Admin decision data for [`BidLifecycle::accept_response`].
#[derive(Debug, Clone)]
pub struct AcceptBid {
    /// Always explicit; `0` means no markup.
    pub markup_percentage: Decimal,
    pub admin_comment: Option<String>,
    /// Assignment role; defaults to the specialist's profession.
    pub role: Option<String>,
}

pub struct BidLifecycle {
    store: Arc<dyn MarketplaceStore>,
    notifier: Arc<dyn Notifier>,
}

impl BidLifecycle {
    pub fn new(store: Arc<dyn MarketplaceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Invite each specialist to bid. Unknown specialists and pairs with an
    /// open request (including one created earlier in this batch) are
    /// reported as skipped; the batch itself only fails on project-level
    /// problems.
    pub async fn send_bids(
        &self,
        project_id: DbId,
        specialist_ids: &[DbId],
        description: String,
        actor: &Actor,
    ) -> LifecycleResult<Vec<BidRequestOutcome>> {
        actor.require_admin()?;
        let description = description.trim().to_string();
        validate_bid_description(&description)?;
        let project = load_project(self.store.as_ref(), project_id).await?;
        require_open(&project)?;

        let mut outcomes = Vec::with_capacity(specialist_ids.len());
        for &specialist_id in specialist_ids {
            let outcome = self
                .send_one(project_id, specialist_id, &description, actor)
                .await?;
            outcomes.push(outcome);
        }

        let sent = outcomes
            .iter()
            .filter(|o| matches!(o, BidRequestOutcome::Sent { .. }))
            .count();
        tracing::info!(
            project_id,
            sent,
            skipped = outcomes.len() - sent,
            "Bid requests sent"
        );
        Ok(outcomes)
    }

    async fn send_one(
        &self,
        project_id: DbId,
        specialist_id: DbId,
        description: &str,
        actor: &Actor,
    ) -> LifecycleResult<BidRequestOutcome> {
        let skip = |reason| BidRequestOutcome::Skipped {
            specialist_id,
            skipped: reason,
        };

        if self.store.find_specialist(specialist_id).await?.is_none() {
            return Ok(skip(SkipReason::SpecialistNotFound));
        }
        if let Some(open) = self
            .store
            .find_open_bid_request(project_id, specialist_id)
            .await?
        {
            return Ok(skip(SkipReason::AlreadyInvited {
                bid_request_id: open.id,
            }));
        }

        let inserted = self
            .store
            .insert_bid_request(CreateBidRequest {
                project_id,
                specialist_id,
                description: description.to_string(),
                created_by: actor.user_id,
            })
            .await;
        let request = match inserted {
            Ok(request) => request,
            // Lost a race with a concurrent batch for the same pair.
            Err(LifecycleError::Core(CoreError::DuplicateBidRequest {
                project_id,
                specialist_id,
            })) => {
                return match self
                    .store
                    .find_open_bid_request(project_id, specialist_id)
                    .await?
                {
                    Some(open) => Ok(skip(SkipReason::AlreadyInvited {
                        bid_request_id: open.id,
                    })),
                    None => Err(CoreError::DuplicateBidRequest {
                        project_id,
                        specialist_id,
                    }
                    .into()),
                };
            }
            Err(e) => return Err(e),
        };

        self.notifier.notify(
            PlatformEvent::new(kinds::BID_REQUESTED)
                .with_source(kinds::entity::BID_REQUEST, request.id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({
                    "project_id": project_id,
                    "specialist_id": specialist_id,
                })),
        );
        Ok(BidRequestOutcome::Sent {
            specialist_id,
            bid_request: request,
        })
    }

    /// Withdraw an unresolved invitation. A pending proposal under it is
    /// rejected.
    pub async fn withdraw_request(
        &self,
        bid_request_id: DbId,
        actor: &Actor,
    ) -> LifecycleResult<BidRequest> {
        actor.require_admin()?;
        let (request, rejected_response) = self
            .store
            .withdraw_bid_request(bid_request_id, actor.user_id, WITHDRAWN_REJECTION_REASON)
            .await?;

        tracing::info!(
            bid_request_id,
            project_id = request.project_id,
            rejected_response_id = rejected_response.as_ref().map(|r| r.id),
            "Bid request withdrawn"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::BID_WITHDRAWN)
                .with_source(kinds::entity::BID_REQUEST, bid_request_id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({
                    "project_id": request.project_id,
                    "specialist_id": request.specialist_id,
                })),
        );
        Ok(request)
    }

    /// Record the invited specialist's proposal.
    pub async fn submit_response(
        &self,
        bid_request_id: DbId,
        proposed_price: Money,
        estimated_days: i32,
        cover_letter: String,
        actor: &Actor,
    ) -> LifecycleResult<BidResponse> {
        let request = self
            .store
            .load_bid_request(bid_request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "BidRequest",
                id: bid_request_id,
            })?;
        if actor.role != ActorRole::Specialist || actor.user_id != request.specialist_id {
            return Err(CoreError::Forbidden(format!(
                "Only the invited specialist may respond to bid request {bid_request_id}"
            ))
            .into());
        }
        let cover_letter = cover_letter.trim().to_string();
        validate_response_input(proposed_price, estimated_days, &cover_letter)?;

        let project = load_project(self.store.as_ref(), request.project_id).await?;
        require_open(&project)?;

        let (request, response) = self
            .store
            .record_bid_response(CreateBidResponse {
                bid_request_id,
                proposed_price,
                estimated_days,
                cover_letter,
            })
            .await?;

        tracing::info!(
            bid_request_id,
            bid_response_id = response.id,
            project_id = request.project_id,
            specialist_id = request.specialist_id,
            proposed_price = %response.proposed_price,
            "Bid response submitted"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::BID_RESPONDED)
                .with_source(kinds::entity::BID_RESPONSE, response.id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({
                    "project_id": request.project_id,
                    "bid_request_id": bid_request_id,
                })),
        );
        Ok(response)
    }

    /// Accept a proposal with an explicit markup and assign the specialist.
    ///
    /// Nothing is written unless the response, its request, and the
    /// assignment can all be committed together.
    pub async fn accept_response(
        &self,
        bid_response_id: DbId,
        decision: AcceptBid,
        actor: &Actor,
    ) -> LifecycleResult<AcceptedBidOutcome> {
        actor.require_admin()?;
        validate_markup(decision.markup_percentage)?;
        let admin_comment = normalize_optional_text(decision.admin_comment);
        validate_admin_note("Admin comment", admin_comment.as_deref())?;

        let response = self
            .store
            .load_bid_response(bid_response_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "BidResponse",
                id: bid_response_id,
            })?;
        let request = self
            .store
            .load_bid_request(response.bid_request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "BidRequest",
                id: response.bid_request_id,
            })?;
        let project = load_project(self.store.as_ref(), request.project_id).await?;
        let specialist = self
            .store
            .find_specialist(request.specialist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Specialist",
                id: request.specialist_id,
            })?;

        let price = final_price(response.proposed_price, decision.markup_percentage)?;
        let assignment = AssignmentCoordinator::prepare(
            &project,
            &specialist,
            decision.role,
            Some(bid_response_id),
        )?;

        let outcome = self
            .store
            .accept_bid(BidAcceptance {
                bid_response_id,
                markup_percentage: decision.markup_percentage,
                final_price: price,
                admin_comment,
                decided_by: actor.user_id,
                assignment,
            })
            .await?;

        tracing::info!(
            bid_response_id,
            project_id = project.id,
            specialist_id = specialist.id,
            markup_percentage = %decision.markup_percentage,
            final_price = %price,
            assignment_id = outcome.assignment.id,
            "Bid response accepted"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::BID_ACCEPTED)
                .with_source(kinds::entity::BID_RESPONSE, bid_response_id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({
                    "project_id": project.id,
                    "specialist_id": specialist.id,
                    "final_price": price,
                })),
        );
        self.notifier.notify(assigned_event(&outcome.assignment, actor));
        Ok(outcome)
    }

    /// Decline a proposal; its request is closed as rejected.
    pub async fn reject_response(
        &self,
        bid_response_id: DbId,
        reason: Option<String>,
        actor: &Actor,
    ) -> LifecycleResult<BidResponse> {
        actor.require_admin()?;
        let reason = normalize_optional_text(reason);
        validate_admin_note("Rejection reason", reason.as_deref())?;

        let (request, response) = self
            .store
            .reject_bid(bid_response_id, actor.user_id, reason.as_deref())
            .await?;

        tracing::info!(
            bid_response_id,
            project_id = request.project_id,
            specialist_id = request.specialist_id,
            "Bid response rejected"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::BID_REJECTED)
                .with_source(kinds::entity::BID_RESPONSE, bid_response_id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({
                    "project_id": request.project_id,
                    "reason": response.rejection_reason,
                })),
        );
        Ok(response)
    }

    /// Every request for a project with its response, if any.
    pub async fn list_requests(
        &self,
        project_id: DbId,
    ) -> LifecycleResult<Vec<BidRequestWithResponse>> {
        load_project(self.store.as_ref(), project_id).await?;
        self.store.list_bid_requests(project_id).await
    }
}
