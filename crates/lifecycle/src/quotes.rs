//! Quote Negotiation Protocol.
//!
//! A quote lives on the project row. Submission and the client's answer are
//! project status changes, gated by the quote rules in `bidwork-core` rather
//! than by the generic transition table.

use std::sync::Arc;

use bidwork_core::error::CoreError;
use bidwork_core::project::{validate_quote_response, ManagementType, ProjectStatus};
use bidwork_core::quote::{
    require_submitted, validate_quote_notes, validate_quote_submission, validate_quoted_amount,
    validate_rejection_reason,
};
use bidwork_core::roles::{Actor, ActorRole};
use bidwork_core::types::{DbId, Money, Timestamp};
use bidwork_core::validation::normalize_optional_text;
use bidwork_db::models::bid::AcceptedBid;
use bidwork_db::models::project::Project;
use bidwork_events::{kinds, PlatformEvent};
use chrono::Utc;
use serde::Serialize;

use crate::error::LifecycleResult;
use crate::notifier::Notifier;
use crate::projects::{apply_status, load_project};
use crate::store::MarketplaceStore;

/// Everything a reader needs to price or review a project's quote.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteData {
    pub project_id: DbId,
    pub status: ProjectStatus,
    pub management_type: ManagementType,
    pub accepted_bids: Vec<AcceptedBid>,
    /// Live sum of accepted bids' final prices.
    pub suggested_amount: Money,
    pub quoted_amount: Option<Money>,
    pub quote_notes: Option<String>,
    pub quote_submitted_at: Option<Timestamp>,
    pub quote_accepted_at: Option<Timestamp>,
    pub quote_rejected_at: Option<Timestamp>,
    pub quote_rejection_reason: Option<String>,
}

fn require_owner(project: &Project, actor: &Actor) -> Result<(), CoreError> {
    if project.is_owned_by(actor.user_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Only the owning client may answer the quote for project {}",
            project.id
        )))
    }
}

fn quote_event(event_type: &str, project: &Project, actor: &Actor) -> PlatformEvent {
    PlatformEvent::new(event_type)
        .with_source(kinds::entity::PROJECT, project.id)
        .with_actor(actor.user_id)
        .with_payload(serde_json::json!({
            "status": project.status,
            "quoted_amount": project.quoted_amount,
        }))
}

pub struct QuoteNegotiation {
    store: Arc<dyn MarketplaceStore>,
    notifier: Arc<dyn Notifier>,
}

impl QuoteNegotiation {
    pub fn new(store: Arc<dyn MarketplaceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Read-only quote view. The suggested amount is recomputed from the
    /// accepted bids on every call.
    pub async fn get_quote_data(
        &self,
        project_id: DbId,
        actor: &Actor,
    ) -> LifecycleResult<QuoteData> {
        let project = load_project(self.store.as_ref(), project_id).await?;
        if !actor.is_admin() && !project.is_owned_by(actor.user_id) {
            return Err(CoreError::Forbidden(format!(
                "Quote for project {project_id} is visible to admins and its owner only"
            ))
            .into());
        }

        let accepted_bids = self.store.list_accepted_bids(project_id).await?;
        let suggested_amount = self.store.sum_accepted_bid_final_prices(project_id).await?;

        Ok(QuoteData {
            project_id,
            status: project.status,
            management_type: project.management_type,
            accepted_bids,
            suggested_amount,
            quoted_amount: project.quoted_amount,
            quote_notes: project.quote_notes,
            quote_submitted_at: project.quote_submitted_at,
            quote_accepted_at: project.quote_accepted_at,
            quote_rejected_at: project.quote_rejected_at,
            quote_rejection_reason: project.quote_rejection_reason,
        })
    }

    /// Put a quote in front of the client (or, for a self-managed project in
    /// progress, let the client price the next phase).
    pub async fn submit_quote(
        &self,
        project_id: DbId,
        quoted_amount: Money,
        notes: Option<String>,
        actor: &Actor,
    ) -> LifecycleResult<Project> {
        validate_quoted_amount(quoted_amount)?;
        let notes = normalize_optional_text(notes);
        validate_quote_notes(notes.as_deref())?;

        let mut project = load_project(self.store.as_ref(), project_id).await?;
        validate_quote_submission(
            project_id,
            project.status,
            project.management_type,
            actor.role,
            project.is_owned_by(actor.user_id),
        )?;

        let from = project.status;
        let expected_version = project.version;
        project.quoted_amount = Some(quoted_amount);
        project.quote_notes = notes;
        apply_status(&mut project, ProjectStatus::QuoteSubmitted, Utc::now());
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(
            project_id,
            from = %from,
            quoted_amount = %quoted_amount,
            actor_id = actor.user_id,
            "Quote submitted"
        );
        self.notifier.notify(quote_event(kinds::QUOTE_SUBMITTED, &saved, actor));
        Ok(saved)
    }

    /// Correct a submitted quote in place. Notes are replaced only when
    /// supplied.
    pub async fn update_quote(
        &self,
        project_id: DbId,
        quoted_amount: Money,
        notes: Option<String>,
        actor: &Actor,
    ) -> LifecycleResult<Project> {
        validate_quoted_amount(quoted_amount)?;
        let notes = normalize_optional_text(notes);
        validate_quote_notes(notes.as_deref())?;

        let mut project = load_project(self.store.as_ref(), project_id).await?;
        let self_managed_owner = actor.role == ActorRole::Client
            && project.management_type == ManagementType::ClientManaged
            && project.is_owned_by(actor.user_id);
        if !actor.is_admin() && !self_managed_owner {
            return Err(CoreError::Forbidden(format!(
                "Role '{}' may not update the quote for project {project_id}",
                actor.role
            ))
            .into());
        }
        require_submitted(project_id, project.status)?;

        let expected_version = project.version;
        project.quoted_amount = Some(quoted_amount);
        if notes.is_some() {
            project.quote_notes = notes;
        }
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(project_id, quoted_amount = %quoted_amount, "Quote updated");
        self.notifier.notify(quote_event(kinds::QUOTE_UPDATED, &saved, actor));
        Ok(saved)
    }

    /// The owning client accepts the submitted quote.
    pub async fn accept_quote(&self, project_id: DbId, actor: &Actor) -> LifecycleResult<Project> {
        let mut project = load_project(self.store.as_ref(), project_id).await?;
        require_owner(&project, actor)?;
        require_submitted(project_id, project.status)?;
        validate_quote_response(project.status, ProjectStatus::QuoteAccepted)?;

        let expected_version = project.version;
        apply_status(&mut project, ProjectStatus::QuoteAccepted, Utc::now());
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(project_id, client_id = actor.user_id, "Quote accepted");
        self.notifier.notify(quote_event(kinds::QUOTE_ACCEPTED, &saved, actor));
        Ok(saved)
    }

    /// The owning client rejects the submitted quote. Notes are kept so the
    /// next submission can build on them.
    pub async fn reject_quote(
        &self,
        project_id: DbId,
        reason: Option<String>,
        actor: &Actor,
    ) -> LifecycleResult<Project> {
        let reason = normalize_optional_text(reason);
        validate_rejection_reason(reason.as_deref())?;

        let mut project = load_project(self.store.as_ref(), project_id).await?;
        require_owner(&project, actor)?;
        require_submitted(project_id, project.status)?;
        validate_quote_response(project.status, ProjectStatus::QuoteRejected)?;

        let expected_version = project.version;
        project.quote_rejection_reason = reason;
        apply_status(&mut project, ProjectStatus::QuoteRejected, Utc::now());
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(
            project_id,
            client_id = actor.user_id,
            reason = ?saved.quote_rejection_reason,
            "Quote rejected"
        );
        self.notifier.notify(quote_event(kinds::QUOTE_REJECTED, &saved, actor));
        Ok(saved)
    }
}
