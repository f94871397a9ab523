//! Marketplace event bus and notification plumbing.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the canonical domain event envelope.
//! - [`kinds`]: event type and source entity names.
//! - [`EventPersistence`]: background service that writes every event to the
//!   `events` table.
//! - [`NotificationRelay`]: background service that hands events to
//!   external [`NotificationSink`]s, logging and swallowing failures.

pub mod bus;
pub mod kinds;
pub mod persistence;
pub mod relay;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
pub use relay::{NotificationRelay, NotificationSink, SinkError, TracingSink};
