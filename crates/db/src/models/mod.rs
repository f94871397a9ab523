//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - An entity struct matching the database row (status columns decoded
//!   into the `bidwork-core` enums)
//! - `Deserialize` create DTOs for inserts

pub mod assignment;
pub mod bid;
pub mod event;
pub mod project;
pub mod specialist;

use bidwork_core::error::CoreError;

/// Wrap a domain decoding failure (unknown status id, bad enum label) as a
/// sqlx decode error.
pub(crate) fn decode_error(err: CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
