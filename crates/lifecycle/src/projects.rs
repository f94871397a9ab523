//! Project State Machine: the authority over project status and management
//! type. Every other service gates its own transitions on the state loaded
//! here.

use std::sync::Arc;

use bidwork_core::error::CoreError;
use bidwork_core::project::{
    validate_management_change, validate_project_fields, validate_transition, ManagementType,
    ProjectStatus, TransitionCheck,
};
use bidwork_core::roles::{Actor, ActorRole};
use bidwork_core::types::{DbId, Timestamp};
use bidwork_core::validation::normalize_optional_text;
use bidwork_db::models::project::{CreateProject, Project};
use bidwork_events::{kinds, PlatformEvent};
use chrono::Utc;

use crate::error::LifecycleResult;
use crate::notifier::Notifier;
use crate::store::MarketplaceStore;

/// Load a project or fail with `NotFound`.
pub(crate) async fn load_project(
    store: &dyn MarketplaceStore,
    project_id: DbId,
) -> LifecycleResult<Project> {
    store.load_project(project_id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }
        .into()
    })
}

/// Reject any mutation of a completed or cancelled project.
pub(crate) fn require_open(project: &Project) -> Result<(), CoreError> {
    if project.status.is_terminal() {
        return Err(CoreError::ProjectClosed {
            project_id: project.id,
            status: project.status.as_str(),
        });
    }
    Ok(())
}

/// Move `project` to `to`, stamping quote milestones and clearing the quoted
/// amount when the target precedes quoting. A new submission starts a fresh
/// round, so the previous round's answer is dropped.
pub(crate) fn apply_status(project: &mut Project, to: ProjectStatus, now: Timestamp) {
    match to {
        ProjectStatus::QuoteSubmitted => {
            project.quote_submitted_at = Some(now);
            project.quote_accepted_at = None;
            project.quote_rejected_at = None;
            project.quote_rejection_reason = None;
        }
        ProjectStatus::QuoteAccepted => project.quote_accepted_at = Some(now),
        ProjectStatus::QuoteRejected => project.quote_rejected_at = Some(now),
        _ => {}
    }
    if !to.carries_quote() {
        project.quoted_amount = None;
    }
    project.status = to;
}

pub(crate) fn status_changed_event(
    project: &Project,
    from: ProjectStatus,
    actor: &Actor,
) -> PlatformEvent {
    PlatformEvent::new(kinds::PROJECT_STATUS_CHANGED)
        .with_source(kinds::entity::PROJECT, project.id)
        .with_actor(actor.user_id)
        .with_payload(serde_json::json!({
            "from": from,
            "to": project.status,
            "version": project.version,
        }))
}

pub struct ProjectStateMachine {
    store: Arc<dyn MarketplaceStore>,
    notifier: Arc<dyn Notifier>,
}

impl ProjectStateMachine {
    pub fn new(store: Arc<dyn MarketplaceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create a project owned by `client_id` in `quote_pending`.
    pub async fn create_project(
        &self,
        client_id: DbId,
        name: String,
        description: Option<String>,
        management_type: ManagementType,
    ) -> LifecycleResult<Project> {
        let name = name.trim().to_string();
        let description = normalize_optional_text(description);
        validate_project_fields(&name, description.as_deref())?;

        let project = self
            .store
            .insert_project(CreateProject {
                client_id,
                name,
                description,
                management_type,
            })
            .await?;

        tracing::info!(
            project_id = project.id,
            client_id,
            management_type = %management_type,
            "Project created"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::PROJECT_CREATED)
                .with_source(kinds::entity::PROJECT, project.id)
                .with_actor(client_id)
                .with_payload(serde_json::json!({ "management_type": management_type })),
        );
        Ok(project)
    }

    pub async fn get_project(&self, project_id: DbId) -> LifecycleResult<Project> {
        load_project(self.store.as_ref(), project_id).await
    }

    /// Apply a status change requested by `actor`.
    ///
    /// A request for the current status succeeds without writing. Quote
    /// submission is not a plain status change; see `QuoteNegotiation`. The
    /// save is version-checked; a concurrent writer makes this call fail with
    /// `VersionConflict`.
    pub async fn transition(
        &self,
        project_id: DbId,
        target: ProjectStatus,
        actor: &Actor,
    ) -> LifecycleResult<Project> {
        let mut project = load_project(self.store.as_ref(), project_id).await?;
        let from = project.status;

        let check = validate_transition(from, target, actor.role, project.management_type)?;
        if actor.role == ActorRole::Client && !project.is_owned_by(actor.user_id) {
            return Err(CoreError::Forbidden(format!(
                "Client {} does not own project {project_id}",
                actor.user_id
            ))
            .into());
        }
        if check == TransitionCheck::NoOp {
            return Ok(project);
        }

        let expected_version = project.version;
        apply_status(&mut project, target, Utc::now());
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(
            project_id,
            from = %from,
            to = %target,
            actor_id = actor.user_id,
            role = %actor.role,
            "Project status changed"
        );
        self.notifier.notify(status_changed_event(&saved, from, actor));
        Ok(saved)
    }

    /// Switch between client- and platform-managed execution.
    ///
    /// Anonymization follows from the stored type at read time, so nothing
    /// else changes here.
    pub async fn set_management_type(
        &self,
        project_id: DbId,
        requested: ManagementType,
        actor: &Actor,
    ) -> LifecycleResult<Project> {
        let mut project = load_project(self.store.as_ref(), project_id).await?;
        let current = project.management_type;

        let check = validate_management_change(
            project.status,
            current,
            requested,
            actor.role,
            project.is_owned_by(actor.user_id),
        )?;
        if check == TransitionCheck::NoOp {
            return Ok(project);
        }

        let expected_version = project.version;
        project.management_type = requested;
        let saved = self.store.save_project(&project, expected_version).await?;

        tracing::info!(
            project_id,
            from = %current,
            to = %requested,
            actor_id = actor.user_id,
            "Project management type changed"
        );
        self.notifier.notify(
            PlatformEvent::new(kinds::PROJECT_MANAGEMENT_TYPE_CHANGED)
                .with_source(kinds::entity::PROJECT, project_id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::json!({ "from": current, "to": requested })),
        );
        Ok(saved)
    }
}
