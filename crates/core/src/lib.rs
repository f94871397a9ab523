//! Domain rules for the engineering-services marketplace.
//!
//! Everything in this crate is pure: status enums and their transition
//! tables, the pricing calculator, quote gating, the anonymization policy,
//! and the shared [`error::CoreError`] taxonomy. Persistence and
//! notification live in the `db`, `events` and `lifecycle` crates.

pub mod assignment;
pub mod bidding;
pub mod error;
pub mod pricing;
pub mod project;
pub mod quote;
pub mod roles;
pub mod status;
pub mod types;
pub mod validation;
