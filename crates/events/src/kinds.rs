//! Event type names published on the bus.
//!
//! Names are dot-separated `<entity>.<verb>` and are stored verbatim in
//! `events.event_type`.

pub const PROJECT_CREATED: &str = "project.created";
pub const PROJECT_STATUS_CHANGED: &str = "project.status_changed";
pub const PROJECT_MANAGEMENT_TYPE_CHANGED: &str = "project.management_type_changed";

pub const QUOTE_SUBMITTED: &str = "quote.submitted";
pub const QUOTE_UPDATED: &str = "quote.updated";
pub const QUOTE_ACCEPTED: &str = "quote.accepted";
pub const QUOTE_REJECTED: &str = "quote.rejected";

pub const BID_REQUESTED: &str = "bid.requested";
pub const BID_RESPONDED: &str = "bid.responded";
pub const BID_ACCEPTED: &str = "bid.accepted";
pub const BID_REJECTED: &str = "bid.rejected";
pub const BID_WITHDRAWN: &str = "bid.withdrawn";

pub const SPECIALIST_ASSIGNED: &str = "specialist.assigned";

/// Source entity names used with [`PlatformEvent::with_source`](crate::PlatformEvent::with_source).
pub mod entity {
    pub const PROJECT: &str = "project";
    pub const BID_REQUEST: &str = "bid_request";
    pub const BID_RESPONSE: &str = "bid_response";
    pub const ASSIGNMENT: &str = "assignment";
}
