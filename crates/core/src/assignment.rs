//! Specialist assignment rules and the anonymization policy for team-member
//! views.
//!
//! The anonymization flag is derived from the project's management type at
//! read time and is never persisted.

use serde::Serialize;

use crate::error::CoreError;
use crate::project::ManagementType;
use crate::types::{DbId, Timestamp};
use crate::validation::{require_non_blank, validate_max_length};

/// Name shown in place of a specialist's real name on anonymized views.
pub const ANONYMIZED_DISPLAY_NAME: &str = "Platform Specialist";

/// Maximum length of an assignment role label.
pub const MAX_ROLE_LENGTH: usize = 100;

/// Identity is hidden from the client whenever the platform manages the
/// relationship.
pub fn is_anonymized(management: ManagementType) -> bool {
    management == ManagementType::PlatformManaged
}

/// Validate an assignment role label.
pub fn validate_role_label(role: &str) -> Result<(), CoreError> {
    require_non_blank("Role", role)?;
    validate_max_length("Role", role, MAX_ROLE_LENGTH)
}

/// Raw data for one team member before the visibility policy is applied.
#[derive(Debug, Clone)]
pub struct TeamMemberSource {
    pub assignment_id: DbId,
    pub specialist_id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profession: Option<String>,
    pub role: String,
    pub assigned_at: Timestamp,
}

/// A team member as exposed to readers of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMemberView {
    pub assignment_id: DbId,
    /// `None` when the specialist's identity is hidden.
    pub specialist_id: Option<DbId>,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profession: Option<String>,
    pub role: String,
    pub assigned_at: Timestamp,
    pub anonymized: bool,
}

/// Apply the visibility policy for `management` to a team member.
///
/// Role and profession are always exposed; name, avatar and user id are
/// replaced when anonymized.
pub fn team_member_view(management: ManagementType, source: TeamMemberSource) -> TeamMemberView {
    let anonymized = is_anonymized(management);
    if anonymized {
        TeamMemberView {
            assignment_id: source.assignment_id,
            specialist_id: None,
            display_name: ANONYMIZED_DISPLAY_NAME.to_string(),
            avatar_url: None,
            profession: source.profession,
            role: source.role,
            assigned_at: source.assigned_at,
            anonymized,
        }
    } else {
        TeamMemberView {
            assignment_id: source.assignment_id,
            specialist_id: Some(source.specialist_id),
            display_name: source.display_name,
            avatar_url: source.avatar_url,
            profession: source.profession,
            role: source.role,
            assigned_at: source.assigned_at,
            anonymized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> TeamMemberSource {
        TeamMemberSource {
            assignment_id: 11,
            specialist_id: 42,
            display_name: "Dana Reyes".into(),
            avatar_url: Some("https://cdn.example/avatars/42.png".into()),
            profession: Some("Structural Engineer".into()),
            role: "Lead structural".into(),
            assigned_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn platform_managed_hides_identity() {
        assert!(is_anonymized(ManagementType::PlatformManaged));
        let view = team_member_view(ManagementType::PlatformManaged, source());
        assert!(view.anonymized);
        assert_eq!(view.display_name, ANONYMIZED_DISPLAY_NAME);
        assert_eq!(view.avatar_url, None);
        assert_eq!(view.specialist_id, None);
        assert_eq!(view.role, "Lead structural");
        assert_eq!(view.profession.as_deref(), Some("Structural Engineer"));
    }

    #[test]
    fn client_managed_shows_identity() {
        assert!(!is_anonymized(ManagementType::ClientManaged));
        let view = team_member_view(ManagementType::ClientManaged, source());
        assert!(!view.anonymized);
        assert_eq!(view.display_name, "Dana Reyes");
        assert_eq!(view.specialist_id, Some(42));
        assert!(view.avatar_url.is_some());
    }

    #[test]
    fn role_label_validation() {
        assert!(validate_role_label("MEP consultant").is_ok());
        assert!(validate_role_label(" ").is_err());
        assert!(validate_role_label(&"r".repeat(MAX_ROLE_LENGTH + 1)).is_err());
    }
}
