//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Every committed marketplace mutation (a project status change, a bid
//! decision, a quote answer) is announced once as a [`PlatformEvent`]. The
//! lifecycle services publish through the `Notifier` seam; the durable log
//! and the notification relay each hold their own subscription.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`. Publishing never blocks and
//! never fails from the publisher's point of view, so a slow consumer can
//! delay its own work but never the mutation that raised the event.

use bidwork_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A committed marketplace mutation.
///
/// Built with [`PlatformEvent::new`] and enriched with
/// [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor) and
/// [`with_payload`](PlatformEvent::with_payload):
///
/// ```rust
/// use bidwork_events::bus::PlatformEvent;
/// use bidwork_events::kinds;
///
/// let event = PlatformEvent::new(kinds::QUOTE_REJECTED)
///     .with_source(kinds::entity::PROJECT, 12)
///     .with_actor(500)
///     .with_payload(serde_json::json!({ "reason": "too high" }));
/// assert_eq!(event.source_entity_id, Some(12));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name such as `"bid.accepted"`. The full set lives
    /// in [`crate::kinds`].
    pub event_type: String,

    /// Kind of the entity the mutation was applied to (`"project"`,
    /// `"bid_request"`, `"bid_response"`, `"assignment"`).
    pub source_entity_type: Option<String>,

    /// Database id of that entity.
    pub source_entity_id: Option<DbId>,

    /// Admin, client or specialist whose request caused the mutation.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data: statuses, prices, reasons.
    pub payload: serde_json::Value,

    /// When the mutation committed. The durable log stores this rather than
    /// its own insert time, so replaying the log preserves commit order even
    /// when persistence lags.
    pub occurred_at: Timestamp,
}

impl PlatformEvent {
    /// Create an event carrying only its type, stamped with the current time.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            occurred_at: Utc::now(),
        }
    }

    /// Attach the entity the mutation was applied to.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Replace the payload. Amounts are serialized as decimal strings.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel. A single `send_bids`
/// batch publishes one event per invited specialist, so the buffer is sized
/// for bursts rather than steady traffic.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so every subscriber independently receives
/// every published [`PlatformEvent`].
///
/// # Usage
///
/// ```rust
/// use bidwork_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("project.created").with_source("project", 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and a
    /// slow subscriber observes `RecvError::Lagged` with the skipped count.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers (the in-memory backend without a relay, for
    /// instance) the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions. Logged at startup once the background
    /// consumers are attached.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds;

    #[tokio::test]
    async fn subscriber_receives_enriched_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new(kinds::BID_ACCEPTED)
                .with_source(kinds::entity::BID_RESPONSE, 42)
                .with_actor(7)
                .with_payload(serde_json::json!({"final_price": "1200.00"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "bid.accepted");
        assert_eq!(received.source_entity_type.as_deref(), Some("bid_response"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["final_price"], "1200.00");
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(PlatformEvent::new(kinds::PROJECT_CREATED));

        assert_eq!(rx1.recv().await.unwrap().event_type, "project.created");
        assert_eq!(rx2.recv().await.unwrap().event_type, "project.created");
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new(kinds::QUOTE_SUBMITTED));
    }

    #[test]
    fn bare_event_has_empty_source_and_object_payload() {
        let before = Utc::now();
        let event = PlatformEvent::new(kinds::PROJECT_STATUS_CHANGED);
        assert!(event.source_entity_type.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
        assert!(event.occurred_at >= before);
    }

    #[tokio::test]
    async fn slow_subscriber_lags_instead_of_blocking_publisher() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(PlatformEvent::new(kinds::BID_REQUESTED));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }
}
