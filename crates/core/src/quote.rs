//! Quote negotiation gating rules.
//!
//! A quote is not stored on its own; it is a set of project fields whose
//! edits are only legal in specific project statuses.

use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::project::{ManagementType, ProjectStatus};
use crate::roles::ActorRole;
use crate::types::{DbId, Money};
use crate::validation::validate_max_length;

/// Maximum length of the notes attached to a quote.
pub const MAX_QUOTE_NOTES_LENGTH: usize = 5_000;

/// Maximum length of a client's rejection reason.
pub const MAX_REJECTION_REASON_LENGTH: usize = 2_000;

/// A quoted amount must be strictly positive.
pub fn validate_quoted_amount(amount: Money) -> Result<(), CoreError> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Quoted amount must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

pub fn validate_quote_notes(notes: Option<&str>) -> Result<(), CoreError> {
    match notes {
        Some(n) => validate_max_length("Quote notes", n, MAX_QUOTE_NOTES_LENGTH),
        None => Ok(()),
    }
}

pub fn validate_rejection_reason(reason: Option<&str>) -> Result<(), CoreError> {
    match reason {
        Some(r) => validate_max_length("Rejection reason", r, MAX_REJECTION_REASON_LENGTH),
        None => Ok(()),
    }
}

/// Whether a project is in the client-managed self-pricing phase, where the
/// owning client prices ongoing work itself.
pub fn is_self_pricing(status: ProjectStatus, management: ManagementType) -> bool {
    status == ProjectStatus::InProgress && management == ManagementType::ClientManaged
}

/// Validate a quote submission.
///
/// - `quote_submitted` fails with `QuoteAlreadySubmitted`.
/// - `quote_pending` / `quote_rejected` accept a submission from a platform admin.
/// - `in_progress` on a client-managed project accepts a submission from the
///   owning client or a platform admin.
/// - Every other status fails with `InvalidProjectStatusForQuote`.
pub fn validate_quote_submission(
    project_id: DbId,
    status: ProjectStatus,
    management: ManagementType,
    role: ActorRole,
    is_owner: bool,
) -> Result<(), CoreError> {
    if status == ProjectStatus::QuoteSubmitted {
        return Err(CoreError::QuoteAlreadySubmitted { project_id });
    }

    let self_pricing = is_self_pricing(status, management);
    let open_for_quote = matches!(
        status,
        ProjectStatus::QuotePending | ProjectStatus::QuoteRejected
    );
    if !open_for_quote && !self_pricing {
        return Err(CoreError::InvalidProjectStatusForQuote {
            project_id,
            status: status.as_str(),
        });
    }

    match role {
        ActorRole::PlatformAdmin => Ok(()),
        ActorRole::Client if self_pricing && is_owner => Ok(()),
        _ => Err(CoreError::Forbidden(format!(
            "Role '{role}' may not submit a quote for a project in status '{status}'"
        ))),
    }
}

/// Quotes can only be corrected or answered while they are awaiting the
/// client's response.
pub fn require_submitted(project_id: DbId, status: ProjectStatus) -> Result<(), CoreError> {
    if status == ProjectStatus::QuoteSubmitted {
        Ok(())
    } else {
        Err(CoreError::InvalidProjectStatusForQuote {
            project_id,
            status: status.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ManagementType::{ClientManaged, PlatformManaged};

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_quoted_amount("2400".parse().unwrap()).is_ok());
        assert!(validate_quoted_amount(Decimal::ZERO).is_err());
        assert!(validate_quoted_amount("-1".parse().unwrap()).is_err());
    }

    #[test]
    fn admin_submits_from_pending_and_rejected() {
        for status in [ProjectStatus::QuotePending, ProjectStatus::QuoteRejected] {
            assert!(validate_quote_submission(
                1,
                status,
                PlatformManaged,
                ActorRole::PlatformAdmin,
                false
            )
            .is_ok());
        }
    }

    #[test]
    fn resubmitting_a_pending_quote_is_a_conflict() {
        let err = validate_quote_submission(
            3,
            ProjectStatus::QuoteSubmitted,
            PlatformManaged,
            ActorRole::PlatformAdmin,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::QuoteAlreadySubmitted { project_id: 3 }));
    }

    #[test]
    fn other_statuses_reject_submission() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::QuoteAccepted,
            ProjectStatus::InitialPaymentPending,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            let err = validate_quote_submission(
                1,
                status,
                ClientManaged,
                ActorRole::PlatformAdmin,
                false,
            )
            .unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidProjectStatusForQuote { .. }),
                "{status}"
            );
        }
    }

    #[test]
    fn in_progress_requires_client_management() {
        let err = validate_quote_submission(
            1,
            ProjectStatus::InProgress,
            PlatformManaged,
            ActorRole::PlatformAdmin,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidProjectStatusForQuote { .. }));
    }

    #[test]
    fn owning_client_self_prices() {
        assert!(validate_quote_submission(
            1,
            ProjectStatus::InProgress,
            ClientManaged,
            ActorRole::Client,
            true
        )
        .is_ok());
        let err = validate_quote_submission(
            1,
            ProjectStatus::InProgress,
            ClientManaged,
            ActorRole::Client,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn client_cannot_submit_platform_quote() {
        let err = validate_quote_submission(
            1,
            ProjectStatus::QuotePending,
            ClientManaged,
            ActorRole::Client,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn require_submitted_gates_updates() {
        assert!(require_submitted(1, ProjectStatus::QuoteSubmitted).is_ok());
        assert!(require_submitted(1, ProjectStatus::QuoteRejected).is_err());
    }
}
