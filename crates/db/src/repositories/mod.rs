//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Operations spanning several
//! tables open their own transaction and report domain-relevant outcomes
//! through small enums instead of errors, so callers can map them onto
//! `CoreError` with full context.

pub mod assignment_repo;
pub mod bid_request_repo;
pub mod bid_response_repo;
pub mod event_repo;
pub mod project_repo;
pub mod specialist_repo;

pub use assignment_repo::AssignmentRepo;
pub use bid_request_repo::{BidRequestRepo, WithdrawOutcome};
pub use bid_response_repo::{AcceptOutcome, BidResponseRepo, RecordOutcome, RejectOutcome};
pub use event_repo::EventRepo;
pub use project_repo::ProjectRepo;
pub use specialist_repo::SpecialistRepo;
