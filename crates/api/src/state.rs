use std::sync::Arc;

use bidwork_events::EventBus;
use bidwork_lifecycle::Marketplace;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The lifecycle services over the configured store.
    pub marketplace: Arc<Marketplace>,
    pub config: Arc<ServerConfig>,
    /// Bus the services publish committed mutations to.
    pub event_bus: Arc<EventBus>,
}
