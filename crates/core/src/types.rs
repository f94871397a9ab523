//! Primitive type aliases shared by every crate in the workspace.

use chrono::{DateTime, Utc};

/// Database primary key type (BIGSERIAL / BIGINT).
pub type DbId = i64;

/// UTC timestamp stored as TIMESTAMPTZ.
pub type Timestamp = DateTime<Utc>;

/// Monetary amount stored as NUMERIC(12, 2).
pub type Money = rust_decimal::Decimal;
