//! The notification seam between services and the event bus.

use bidwork_events::{EventBus, PlatformEvent};

/// Receives an event after the mutation that produced it has committed.
///
/// Implementations must not block and have no way to fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: PlatformEvent);
}

impl Notifier for EventBus {
    fn notify(&self, event: PlatformEvent) {
        self.publish(event);
    }
}

/// Notifier that drops every event.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: PlatformEvent) {}
}
