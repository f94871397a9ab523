//! Project lifecycle status, management mode, and the per-role transition
//! tables that gate every project status change.
//!
//! The tables are plain data so callers and tests can enumerate every
//! `(status, role, management type, target)` combination.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::ActorRole;
use crate::status::define_status_enum;
use crate::validation::{require_non_blank, validate_max_length};

/// Maximum length of a project name.
pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

/// Maximum length of a project description.
pub const MAX_PROJECT_DESCRIPTION_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

define_status_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        QuotePending = 1 => "quote_pending",
        Draft = 2 => "draft",
        QuoteSubmitted = 3 => "quote_submitted",
        QuoteAccepted = 4 => "quote_accepted",
        QuoteRejected = 5 => "quote_rejected",
        InitialPaymentPending = 6 => "initial_payment_pending",
        InitialPaymentComplete = 7 => "initial_payment_complete",
        InProgress = 8 => "in_progress",
        Completed = 9 => "completed",
        Cancelled = 10 => "cancelled",
    }
}

impl ProjectStatus {
    /// `Completed` and `Cancelled` end the lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }

    /// Whether a project in this status may hold a quoted amount.
    pub fn carries_quote(self) -> bool {
        !matches!(self, ProjectStatus::QuotePending | ProjectStatus::Draft)
    }
}

// ---------------------------------------------------------------------------
// Management type
// ---------------------------------------------------------------------------

/// Who directs day-to-day execution and specialist visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementType {
    ClientManaged,
    PlatformManaged,
}

pub const MANAGEMENT_CLIENT: &str = "client_managed";
pub const MANAGEMENT_PLATFORM: &str = "platform_managed";

impl ManagementType {
    pub const ALL: [ManagementType; 2] =
        [ManagementType::ClientManaged, ManagementType::PlatformManaged];

    pub fn as_str(self) -> &'static str {
        match self {
            ManagementType::ClientManaged => MANAGEMENT_CLIENT,
            ManagementType::PlatformManaged => MANAGEMENT_PLATFORM,
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            MANAGEMENT_CLIENT => Ok(ManagementType::ClientManaged),
            MANAGEMENT_PLATFORM => Ok(ManagementType::PlatformManaged),
            other => Err(CoreError::Validation(format!(
                "Invalid management type '{other}'. Must be one of: {MANAGEMENT_CLIENT}, {MANAGEMENT_PLATFORM}"
            ))),
        }
    }
}

impl std::fmt::Display for ManagementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate the name and description given at project creation.
pub fn validate_project_fields(name: &str, description: Option<&str>) -> Result<(), CoreError> {
    require_non_blank("Project name", name)?;
    validate_max_length("Project name", name, MAX_PROJECT_NAME_LENGTH)?;
    if let Some(d) = description {
        validate_max_length("Project description", d, MAX_PROJECT_DESCRIPTION_LENGTH)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transition tables
// ---------------------------------------------------------------------------

use ProjectStatus::*;

/// Successors a platform admin may move a project to.
///
/// - `quote_pending`            -> `draft`, `cancelled`
/// - `draft`                    -> `quote_pending`, `cancelled`
/// - `quote_submitted`          -> `quote_accepted`, `quote_rejected`, `cancelled`
/// - `quote_accepted`           -> `initial_payment_pending`, `cancelled`
/// - `quote_rejected`           -> `quote_pending`, `cancelled`
/// - `initial_payment_pending`  -> `initial_payment_complete`, `cancelled`
/// - `initial_payment_complete` -> `in_progress`, `cancelled`
/// - `in_progress`              -> `completed`, `cancelled`
///
/// `quote_submitted` is never a plain status target. It is entered only by
/// submitting a quote, which carries the amount and is gated by
/// [`crate::quote::validate_quote_submission`].
pub fn admin_successors(from: ProjectStatus) -> &'static [ProjectStatus] {
    match from {
        QuotePending => &[Draft, Cancelled],
        Draft => &[QuotePending, Cancelled],
        QuoteSubmitted => &[QuoteAccepted, QuoteRejected, Cancelled],
        QuoteAccepted => &[InitialPaymentPending, Cancelled],
        QuoteRejected => &[QuotePending, Cancelled],
        InitialPaymentPending => &[InitialPaymentComplete, Cancelled],
        InitialPaymentComplete => &[InProgress, Cancelled],
        InProgress => &[Completed, Cancelled],
        Completed | Cancelled => &[],
    }
}

/// Successors the owning client may choose on a client-managed project:
/// responding to a quote, and driving execution it manages itself.
pub fn client_successors(from: ProjectStatus) -> &'static [ProjectStatus] {
    match from {
        QuoteSubmitted => &[QuoteAccepted, QuoteRejected],
        InitialPaymentComplete => &[InProgress],
        InProgress => &[Completed],
        _ => &[],
    }
}

/// Targets a client's quote response may move a submitted quote to,
/// independent of management type.
pub const QUOTE_RESPONSE_TARGETS: &[ProjectStatus] = &[QuoteAccepted, QuoteRejected];

/// Whether `role` may direct status changes on a project with the given
/// management type at all.
pub fn may_direct(role: ActorRole, management: ManagementType) -> bool {
    match role {
        ActorRole::PlatformAdmin => true,
        ActorRole::Client => management == ManagementType::ClientManaged,
        ActorRole::Specialist => false,
    }
}

/// Successors permitted for `role` on a project with the given management type.
pub fn permitted_successors(
    from: ProjectStatus,
    role: ActorRole,
    management: ManagementType,
) -> &'static [ProjectStatus] {
    match (role, management) {
        (ActorRole::PlatformAdmin, _) => admin_successors(from),
        (ActorRole::Client, ManagementType::ClientManaged) => client_successors(from),
        _ => &[],
    }
}

/// Outcome of a successful transition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// The target equals the current value; nothing to write.
    NoOp,
    /// The change is permitted and must be applied.
    Apply,
}

fn invalid(from: ProjectStatus, to: ProjectStatus) -> CoreError {
    CoreError::InvalidTransition {
        entity: "Project",
        from: from.as_str(),
        to: to.as_str(),
    }
}

/// Validate a project status change requested by `role`.
///
/// Terminal statuses reject everything, including a same-status request.
/// A same-status request on a live project is an idempotent no-op for a
/// role that may direct the project, and invalid for any other role.
pub fn validate_transition(
    from: ProjectStatus,
    to: ProjectStatus,
    role: ActorRole,
    management: ManagementType,
) -> Result<TransitionCheck, CoreError> {
    if from.is_terminal() {
        return Err(invalid(from, to));
    }
    if from == to {
        return if may_direct(role, management) {
            Ok(TransitionCheck::NoOp)
        } else {
            Err(invalid(from, to))
        };
    }
    if permitted_successors(from, role, management).contains(&to) {
        Ok(TransitionCheck::Apply)
    } else {
        Err(invalid(from, to))
    }
}

/// Validate a client's response to a submitted quote.
pub fn validate_quote_response(
    from: ProjectStatus,
    to: ProjectStatus,
) -> Result<(), CoreError> {
    if from == QuoteSubmitted && QUOTE_RESPONSE_TARGETS.contains(&to) {
        Ok(())
    } else {
        Err(invalid(from, to))
    }
}

/// Validate a management-type change.
///
/// A platform admin may set either type. The owning client may only take
/// over management (platform-managed -> client-managed). Closed projects
/// cannot change mode.
pub fn validate_management_change(
    status: ProjectStatus,
    current: ManagementType,
    requested: ManagementType,
    role: ActorRole,
    is_owner: bool,
) -> Result<TransitionCheck, CoreError> {
    if status.is_terminal() {
        return Err(CoreError::InvalidTransition {
            entity: "ManagementType",
            from: current.as_str(),
            to: requested.as_str(),
        });
    }

    let allowed = match role {
        ActorRole::PlatformAdmin => true,
        ActorRole::Client => {
            is_owner
                && (current == requested
                    || (current == ManagementType::PlatformManaged
                        && requested == ManagementType::ClientManaged))
        }
        ActorRole::Specialist => false,
    };
    if !allowed {
        return Err(CoreError::Forbidden(format!(
            "Role '{role}' may not change management type from '{current}' to '{requested}'"
        )));
    }

    if current == requested {
        Ok(TransitionCheck::NoOp)
    } else {
        Ok(TransitionCheck::Apply)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_ids_match_seed_data() {
        assert_eq!(QuotePending.id(), 1);
        assert_eq!(Draft.id(), 2);
        assert_eq!(QuoteSubmitted.id(), 3);
        assert_eq!(InProgress.id(), 8);
        assert_eq!(Cancelled.id(), 10);
        assert_eq!(ProjectStatus::ALL.len(), 10);
    }

    #[test]
    fn status_ids_and_labels_map_back() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::from_id(status.id()).unwrap(), *status);
            assert_eq!(ProjectStatus::from_label(status.as_str()).unwrap(), *status);
        }
        assert!(ProjectStatus::from_id(0).is_err());
        assert!(ProjectStatus::from_label("archived").is_err());
    }

    #[test]
    fn every_triple_matches_the_table() {
        for from in ProjectStatus::ALL {
            for to in ProjectStatus::ALL {
                for role in ActorRole::ALL {
                    for management in ManagementType::ALL {
                        let result = validate_transition(*from, *to, role, management);
                        let expected_ok = !from.is_terminal()
                            && ((from == to && may_direct(role, management))
                                || permitted_successors(*from, role, management).contains(to));
                        assert_eq!(
                            result.is_ok(),
                            expected_ok,
                            "{from} -> {to} as {role} on {management}"
                        );
                        if let Err(err) = result {
                            assert!(matches!(err, CoreError::InvalidTransition { .. }));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn cancelled_reachable_by_admin_from_every_live_status() {
        for from in ProjectStatus::ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(admin_successors(*from).contains(&Cancelled), "{from}");
        }
    }

    #[test]
    fn admin_table_is_superset_of_client_table() {
        for from in ProjectStatus::ALL {
            for to in client_successors(*from) {
                assert!(admin_successors(*from).contains(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_statuses_reject_even_same_status() {
        for terminal in [Completed, Cancelled] {
            let err = validate_transition(
                terminal,
                terminal,
                ActorRole::PlatformAdmin,
                ManagementType::PlatformManaged,
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn same_status_is_noop_for_roles_that_direct_the_project() {
        let check = validate_transition(
            InProgress,
            InProgress,
            ActorRole::PlatformAdmin,
            ManagementType::PlatformManaged,
        )
        .unwrap();
        assert_eq!(check, TransitionCheck::NoOp);

        let check = validate_transition(
            QuotePending,
            QuotePending,
            ActorRole::Client,
            ManagementType::ClientManaged,
        )
        .unwrap();
        assert_eq!(check, TransitionCheck::NoOp);
    }

    #[test]
    fn same_status_is_invalid_without_rights() {
        for (role, management) in [
            (ActorRole::Specialist, ManagementType::PlatformManaged),
            (ActorRole::Specialist, ManagementType::ClientManaged),
            (ActorRole::Client, ManagementType::PlatformManaged),
        ] {
            let err = validate_transition(InProgress, InProgress, role, management).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidTransition { from: "in_progress", .. }),
                "{role} on {management}"
            );
        }
    }

    #[test]
    fn quote_submitted_is_never_a_plain_target() {
        for from in ProjectStatus::ALL {
            for role in ActorRole::ALL {
                for management in ManagementType::ALL {
                    if *from == QuoteSubmitted {
                        continue;
                    }
                    assert!(
                        validate_transition(*from, QuoteSubmitted, role, management).is_err(),
                        "{from} as {role} on {management}"
                    );
                }
            }
        }
    }

    #[test]
    fn client_has_no_rights_on_platform_managed_project() {
        for from in ProjectStatus::ALL {
            assert!(
                permitted_successors(*from, ActorRole::Client, ManagementType::PlatformManaged)
                    .is_empty()
            );
        }
    }

    #[test]
    fn client_drives_execution_when_self_managing() {
        assert!(validate_transition(
            InitialPaymentComplete,
            InProgress,
            ActorRole::Client,
            ManagementType::ClientManaged
        )
        .is_ok());
        assert!(validate_transition(
            InProgress,
            Completed,
            ActorRole::Client,
            ManagementType::ClientManaged
        )
        .is_ok());
        assert!(validate_transition(
            QuoteAccepted,
            InitialPaymentPending,
            ActorRole::Client,
            ManagementType::ClientManaged
        )
        .is_err());
    }

    #[test]
    fn quote_response_only_from_submitted() {
        assert!(validate_quote_response(QuoteSubmitted, QuoteAccepted).is_ok());
        assert!(validate_quote_response(QuoteSubmitted, QuoteRejected).is_ok());
        assert!(validate_quote_response(QuoteSubmitted, Cancelled).is_err());
        assert!(validate_quote_response(QuoteRejected, QuoteAccepted).is_err());
    }

    #[test]
    fn pre_quote_statuses_do_not_carry_quote() {
        assert!(!QuotePending.carries_quote());
        assert!(!Draft.carries_quote());
        assert!(QuoteSubmitted.carries_quote());
        assert!(InProgress.carries_quote());
    }

    #[test]
    fn project_fields_validation() {
        assert!(validate_project_fields("Warehouse retrofit", None).is_ok());
        assert!(validate_project_fields("   ", None).is_err());
        assert!(validate_project_fields(&"n".repeat(MAX_PROJECT_NAME_LENGTH + 1), None).is_err());
        let long = "d".repeat(MAX_PROJECT_DESCRIPTION_LENGTH + 1);
        assert!(validate_project_fields("Retrofit", Some(&long)).is_err());
    }

    #[test]
    fn management_type_labels() {
        assert_eq!(
            ManagementType::from_str_db("client_managed").unwrap(),
            ManagementType::ClientManaged
        );
        assert!(ManagementType::from_str_db("self").is_err());
    }

    #[test]
    fn owner_may_take_over_management() {
        let check = validate_management_change(
            QuotePending,
            ManagementType::PlatformManaged,
            ManagementType::ClientManaged,
            ActorRole::Client,
            true,
        )
        .unwrap();
        assert_eq!(check, TransitionCheck::Apply);
    }

    #[test]
    fn owner_may_not_hand_management_back() {
        let err = validate_management_change(
            InProgress,
            ManagementType::ClientManaged,
            ManagementType::PlatformManaged,
            ActorRole::Client,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn non_owner_client_is_forbidden() {
        let err = validate_management_change(
            QuotePending,
            ManagementType::PlatformManaged,
            ManagementType::ClientManaged,
            ActorRole::Client,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn admin_may_set_either_type_and_same_type_is_noop() {
        assert_eq!(
            validate_management_change(
                InProgress,
                ManagementType::ClientManaged,
                ManagementType::PlatformManaged,
                ActorRole::PlatformAdmin,
                false,
            )
            .unwrap(),
            TransitionCheck::Apply
        );
        assert_eq!(
            validate_management_change(
                InProgress,
                ManagementType::ClientManaged,
                ManagementType::ClientManaged,
                ActorRole::PlatformAdmin,
                false,
            )
            .unwrap(),
            TransitionCheck::NoOp
        );
    }

    #[test]
    fn closed_project_cannot_change_management() {
        let err = validate_management_change(
            Completed,
            ManagementType::PlatformManaged,
            ManagementType::ClientManaged,
            ActorRole::PlatformAdmin,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }
}
