use serde::Serialize;

use crate::types::DbId;

/// Coarse classification of a [`CoreError`].
///
/// Callers use the kind to decide how to surface an error: a `Conflict` means
/// "someone else just changed this, refresh", an `InvalidStateTransition`
/// means "this action isn't allowed right now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidStateTransition,
    Conflict,
    Validation,
    Unauthorized,
    Forbidden,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot transition {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("{entity} {id} is '{status}', expected '{expected}'")]
    InvalidBidStatus {
        entity: &'static str,
        id: DbId,
        status: &'static str,
        expected: &'static str,
    },

    #[error("Project {project_id} in status '{status}' does not accept this quote operation")]
    InvalidProjectStatusForQuote {
        project_id: DbId,
        status: &'static str,
    },

    #[error("Project {project_id} is '{status}' and no longer accepts changes")]
    ProjectClosed {
        project_id: DbId,
        status: &'static str,
    },

    #[error("Quote for project {project_id} has already been submitted")]
    QuoteAlreadySubmitted { project_id: DbId },

    #[error("Specialist {specialist_id} is already assigned to project {project_id}")]
    SpecialistAlreadyAssigned { project_id: DbId, specialist_id: DbId },

    #[error("Specialist {specialist_id} already has an open bid request on project {project_id}")]
    DuplicateBidRequest { project_id: DbId, specialist_id: DbId },

    #[error("{entity} {id} was modified concurrently (expected version {expected_version})")]
    VersionConflict {
        entity: &'static str,
        id: DbId,
        expected_version: i32,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Classify this error into the taxonomy used by the HTTP layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::InvalidTransition { .. }
            | CoreError::InvalidBidStatus { .. }
            | CoreError::InvalidProjectStatusForQuote { .. }
            | CoreError::ProjectClosed { .. } => ErrorKind::InvalidStateTransition,
            CoreError::QuoteAlreadySubmitted { .. }
            | CoreError::SpecialistAlreadyAssigned { .. }
            | CoreError::DuplicateBidRequest { .. }
            | CoreError::VersionConflict { .. }
            | CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            CoreError::Forbidden(_) => ErrorKind::Forbidden,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}
