//! Specialist Assignment Coordinator: exclusive project assignment and the
//! team-member visibility policy.

use std::sync::Arc;

use bidwork_core::assignment::{
    is_anonymized, team_member_view, validate_role_label, TeamMemberView,
};
use bidwork_core::error::CoreError;
use bidwork_core::roles::Actor;
use bidwork_core::types::DbId;
use bidwork_db::models::assignment::{Assignment, CreateAssignment};
use bidwork_db::models::project::Project;
use bidwork_db::models::specialist::Specialist;
use bidwork_events::{kinds, PlatformEvent};
use serde::Serialize;

use crate::error::LifecycleResult;
use crate::notifier::Notifier;
use crate::projects::{load_project, require_open};
use crate::store::MarketplaceStore;

/// A project's team as shown to any reader.
#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    pub project_id: DbId,
    pub anonymized: bool,
    pub members: Vec<TeamMemberView>,
}

pub(crate) fn assigned_event(assignment: &Assignment, actor: &Actor) -> PlatformEvent {
    PlatformEvent::new(kinds::SPECIALIST_ASSIGNED)
        .with_source(kinds::entity::ASSIGNMENT, assignment.id)
        .with_actor(actor.user_id)
        .with_payload(serde_json::json!({
            "project_id": assignment.project_id,
            "specialist_id": assignment.specialist_id,
            "role": assignment.role,
            "bid_response_id": assignment.bid_response_id,
        }))
}

pub struct AssignmentCoordinator {
    store: Arc<dyn MarketplaceStore>,
    notifier: Arc<dyn Notifier>,
}

impl AssignmentCoordinator {
    pub fn new(store: Arc<dyn MarketplaceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Build the validated assignment committed together with a bid
    /// acceptance. Without an explicit role the specialist's profession is
    /// used.
    pub fn prepare(
        project: &Project,
        specialist: &Specialist,
        role: Option<String>,
        bid_response_id: Option<DbId>,
    ) -> Result<CreateAssignment, CoreError> {
        require_open(project)?;
        let role = role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .or_else(|| specialist.profession.clone())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Role is required: specialist {} has no profession on file",
                    specialist.id
                ))
            })?;
        validate_role_label(&role)?;

        Ok(CreateAssignment {
            project_id: project.id,
            specialist_id: specialist.id,
            role,
            bid_response_id,
        })
    }

    /// Assign a specialist directly, outside the bidding flow.
    pub async fn assign(
        &self,
        project_id: DbId,
        specialist_id: DbId,
        role: String,
        actor: &Actor,
    ) -> LifecycleResult<Assignment> {
        actor.require_admin()?;
        let role = role.trim().to_string();
        validate_role_label(&role)?;

        let project = load_project(self.store.as_ref(), project_id).await?;
        require_open(&project)?;
        let specialist = self
            .store
            .find_specialist(specialist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Specialist",
                id: specialist_id,
            })?;

        let input = Self::prepare(&project, &specialist, Some(role), None)?;
        let assignment = self.store.insert_assignment(input).await?;

        tracing::info!(
            project_id,
            specialist_id,
            assignment_id = assignment.id,
            role = %assignment.role,
            "Specialist assigned"
        );
        self.notifier.notify(assigned_event(&assignment, actor));
        Ok(assignment)
    }

    /// Whether specialist identity is hidden on this project. Derived from
    /// the management type on every call.
    pub async fn compute_anonymization(&self, project_id: DbId) -> LifecycleResult<bool> {
        let project = load_project(self.store.as_ref(), project_id).await?;
        Ok(is_anonymized(project.management_type))
    }

    /// The project's team with the visibility policy applied. The result is
    /// the same for every caller.
    pub async fn team_members(&self, project_id: DbId) -> LifecycleResult<TeamView> {
        let project = load_project(self.store.as_ref(), project_id).await?;
        let members = self
            .store
            .list_team(project_id)
            .await?
            .into_iter()
            .map(|source| team_member_view(project.management_type, source))
            .collect();

        Ok(TeamView {
            project_id,
            anonymized: is_anonymized(project.management_type),
            members,
        })
    }

    pub async fn list_assignments(&self, project_id: DbId) -> LifecycleResult<Vec<Assignment>> {
        load_project(self.store.as_ref(), project_id).await?;
        self.store.list_assignments(project_id).await
    }
}
