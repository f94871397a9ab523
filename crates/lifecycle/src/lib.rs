//! Coordinating services for the marketplace lifecycle.
//!
//! - [`ProjectStateMachine`]: project status and management type.
//! - [`BidLifecycle`]: bid requests, responses and admin decisions.
//! - [`AssignmentCoordinator`]: exclusive assignment and team visibility.
//! - [`QuoteNegotiation`]: quote submission and the client's answer.
//!
//! Services share one [`MarketplaceStore`] and one [`Notifier`]. Every
//! committed mutation is followed by a single non-blocking `notify`.

use std::sync::Arc;

pub mod assignments;
pub mod bids;
pub mod error;
pub mod notifier;
pub mod projects;
pub mod quotes;
pub mod store;

pub use assignments::{AssignmentCoordinator, TeamView};
pub use bids::{AcceptBid, BidLifecycle, BidRequestOutcome};
pub use error::{LifecycleError, LifecycleResult};
pub use notifier::{Notifier, NullNotifier};
pub use projects::ProjectStateMachine;
pub use quotes::{QuoteData, QuoteNegotiation};
pub use store::{MarketplaceStore, MemoryStore, PgStore};

/// The four services wired to a shared store and notifier.
pub struct Marketplace {
    pub projects: ProjectStateMachine,
    pub bids: BidLifecycle,
    pub assignments: AssignmentCoordinator,
    pub quotes: QuoteNegotiation,
    store: Arc<dyn MarketplaceStore>,
}

impl Marketplace {
    pub fn new(store: Arc<dyn MarketplaceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            projects: ProjectStateMachine::new(store.clone(), notifier.clone()),
            bids: BidLifecycle::new(store.clone(), notifier.clone()),
            assignments: AssignmentCoordinator::new(store.clone(), notifier.clone()),
            quotes: QuoteNegotiation::new(store.clone(), notifier),
            store,
        }
    }

    /// A marketplace over a fresh [`MemoryStore`].
    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), notifier)
    }

    pub fn store(&self) -> &Arc<dyn MarketplaceStore> {
        &self.store
    }
}
