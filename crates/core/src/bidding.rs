//! Bid request / bid response statuses, their transition rules, and input
//! validation for specialist proposals.

use serde::Serialize;

use crate::error::CoreError;
use crate::pricing::validate_proposed_price;
use crate::status::define_status_enum;
use crate::types::{DbId, Money};
use crate::validation::{require_non_blank, validate_max_length};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for the bid request description sent to specialists.
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;

/// Maximum length for a specialist's cover letter.
pub const MAX_COVER_LETTER_LENGTH: usize = 10_000;

/// Upper bound on a proposal's estimated duration.
pub const MAX_ESTIMATED_DAYS: i32 = 3_650;

/// Maximum length for an admin's comment or rejection reason on a response.
pub const MAX_ADMIN_NOTE_LENGTH: usize = 2_000;

/// Reason recorded on a pending response whose request is withdrawn.
pub const WITHDRAWN_REJECTION_REASON: &str = "bid request withdrawn";

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

define_status_enum! {
    /// Status of an invitation sent to a specialist.
    BidRequestStatus {
        Pending = 1 => "pending",
        Responded = 2 => "responded",
        Accepted = 3 => "accepted",
        Rejected = 4 => "rejected",
        Withdrawn = 5 => "withdrawn",
    }
}

define_status_enum! {
    /// Status of a specialist's priced proposal.
    BidResponseStatus {
        Pending = 1 => "pending",
        Accepted = 2 => "accepted",
        Rejected = 3 => "rejected",
    }
}

impl BidRequestStatus {
    /// Every status except `Withdrawn` blocks a second request for the same
    /// (project, specialist) pair.
    pub fn blocks_new_request(self) -> bool {
        self != BidRequestStatus::Withdrawn
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Returns the statuses a bid request may move to.
///
/// - `pending`   -> `responded`, `withdrawn`
/// - `responded` -> `accepted`, `rejected`, `withdrawn`
pub fn request_successors(from: BidRequestStatus) -> &'static [BidRequestStatus] {
    use BidRequestStatus::*;
    match from {
        Pending => &[Responded, Withdrawn],
        Responded => &[Accepted, Rejected, Withdrawn],
        Accepted | Rejected | Withdrawn => &[],
    }
}

/// Returns the statuses a bid response may move to. Resolved responses are
/// terminal.
pub fn response_successors(from: BidResponseStatus) -> &'static [BidResponseStatus] {
    use BidResponseStatus::*;
    match from {
        Pending => &[Accepted, Rejected],
        Accepted | Rejected => &[],
    }
}

fn expected_request_source(to: BidRequestStatus) -> &'static str {
    match to {
        BidRequestStatus::Responded => "pending",
        BidRequestStatus::Accepted | BidRequestStatus::Rejected => "responded",
        BidRequestStatus::Withdrawn => "pending or responded",
        BidRequestStatus::Pending => "none",
    }
}

/// Validate a bid request status change.
pub fn validate_request_transition(
    id: DbId,
    from: BidRequestStatus,
    to: BidRequestStatus,
) -> Result<(), CoreError> {
    if request_successors(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidBidStatus {
            entity: "BidRequest",
            id,
            status: from.as_str(),
            expected: expected_request_source(to),
        })
    }
}

/// Validate a bid response status change.
pub fn validate_response_transition(
    id: DbId,
    from: BidResponseStatus,
    to: BidResponseStatus,
) -> Result<(), CoreError> {
    if response_successors(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::InvalidBidStatus {
            entity: "BidResponse",
            id,
            status: from.as_str(),
            expected: BidResponseStatus::Pending.as_str(),
        })
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Validate the description attached to a batch of bid requests.
pub fn validate_bid_description(description: &str) -> Result<(), CoreError> {
    require_non_blank("Bid description", description)?;
    validate_max_length("Bid description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validate a specialist's proposal before anything is written.
pub fn validate_response_input(
    proposed_price: Money,
    estimated_days: i32,
    cover_letter: &str,
) -> Result<(), CoreError> {
    validate_proposed_price(proposed_price)?;
    if estimated_days <= 0 || estimated_days > MAX_ESTIMATED_DAYS {
        return Err(CoreError::Validation(format!(
            "Estimated days must be between 1 and {MAX_ESTIMATED_DAYS}, got {estimated_days}"
        )));
    }
    require_non_blank("Cover letter", cover_letter)?;
    validate_max_length("Cover letter", cover_letter, MAX_COVER_LETTER_LENGTH)
}

/// Validate an optional admin comment or rejection reason.
pub fn validate_admin_note(field: &str, note: Option<&str>) -> Result<(), CoreError> {
    match note {
        Some(n) => validate_max_length(field, n, MAX_ADMIN_NOTE_LENGTH),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Batch outcomes
// ---------------------------------------------------------------------------

/// Why a specialist was skipped when sending a batch of bid requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No specialist with this user id exists.
    SpecialistNotFound,
    /// A non-withdrawn request already exists for the pair.
    AlreadyInvited { bid_request_id: DbId },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SpecialistNotFound => f.write_str("specialist not found"),
            SkipReason::AlreadyInvited { bid_request_id } => {
                write!(f, "already invited (bid request {bid_request_id})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
