//! Durable event log.
//!
//! [`EventPersistence`] subscribes to the bus and writes every received
//! [`PlatformEvent`] to the `events` table. Failures are logged and the loop
//! keeps going; the mutation that produced the event has already committed.

use bidwork_core::types::DbId;
use bidwork_db::repositories::EventRepo;
use bidwork_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;

/// Background service that persists platform events.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the bus is dropped or `cancel` fires.
    pub async fn run(
        pool: DbPool,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event persistence cancelled");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
            event.occurred_at,
        )
        .await
    }
}
