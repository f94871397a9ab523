//! Request handlers. Each handler validates its body with `validator`,
//! converts the caller into an [`bidwork_core::roles::Actor`] and delegates
//! to the lifecycle services, which enforce every domain rule.

pub mod assignment;
pub mod bid;
pub mod project;
pub mod quote;
