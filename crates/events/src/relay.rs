//! Fire-and-forget notification delivery.
//!
//! Delivery channels (email, push, webhooks) live outside this workspace.
//! They plug in as [`NotificationSink`]s; the [`NotificationRelay`] feeds
//! them from the event bus. A failed or slow sink is logged and skipped so
//! it can never affect the mutation that raised the event.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;

/// Upper bound on a single sink delivery.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The downstream channel could not be reached.
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("Notification delivery timed out after {0:?}")]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// An external notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError>;
}

/// Sink that only writes a structured log line per event. Used when no
/// external channel is configured.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError> {
        tracing::info!(
            event_type = %event.event_type,
            source_entity_type = ?event.source_entity_type,
            source_entity_id = ?event.source_entity_id,
            actor_user_id = ?event.actor_user_id,
            "Notification"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NotificationRelay
// ---------------------------------------------------------------------------

/// Background service forwarding bus events to every configured sink.
pub struct NotificationRelay {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationRelay {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }

    /// Deliver one event to every sink. Failures are logged and swallowed.
    ///
    /// Returns the number of sinks that failed.
    pub async fn dispatch(&self, event: &PlatformEvent) -> usize {
        let mut failed = 0;
        for sink in &self.sinks {
            let result = match tokio::time::timeout(DELIVERY_TIMEOUT, sink.deliver(event)).await {
                Ok(result) => result,
                Err(_) => Err(SinkError::Timeout(DELIVERY_TIMEOUT)),
            };
            if let Err(e) = result {
                failed += 1;
                tracing::warn!(
                    sink = sink.name(),
                    event_type = %event.event_type,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
        failed
    }

    /// Run the relay loop until the bus is dropped or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification relay cancelled");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) => {
                    self.dispatch(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::bus::EventBus;
    use crate::kinds;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(event.event_type.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn deliver(&self, _event: &PlatformEvent) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("smtp down".into()))
        }
    }

    #[tokio::test]
    async fn failing_sink_does_not_block_the_others() {
        let recording = Arc::new(RecordingSink::default());
        let relay = NotificationRelay::new(vec![
            Arc::new(FailingSink),
            recording.clone(),
            Arc::new(TracingSink),
        ]);

        let failed = relay.dispatch(&PlatformEvent::new(kinds::QUOTE_SUBMITTED)).await;

        assert_eq!(failed, 1);
        assert_eq!(*recording.seen.lock().unwrap(), vec!["quote.submitted".to_string()]);
    }

    #[tokio::test]
    async fn run_forwards_events_until_cancelled() {
        let bus = EventBus::default();
        let recording = Arc::new(RecordingSink::default());
        let relay = NotificationRelay::new(vec![recording.clone()]);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(relay.run(bus.subscribe(), cancel.clone()));

        bus.publish(PlatformEvent::new(kinds::BID_REQUESTED));
        bus.publish(PlatformEvent::new(kinds::BID_RESPONDED));

        for _ in 0..100 {
            if recording.seen.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(
            *recording.seen.lock().unwrap(),
            vec!["bid.requested".to_string(), "bid.responded".to_string()]
        );
    }

    #[tokio::test]
    async fn run_stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let relay = NotificationRelay::new(vec![Arc::new(TracingSink)]);
        let handle = tokio::spawn(relay.run(bus.subscribe(), CancellationToken::new()));
        drop(bus);
        handle.await.unwrap();
    }
}
