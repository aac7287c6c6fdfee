//! Auth failure notifications.
//!
//! A broadcast channel replaces the usual "global on-401 callback": any
//! number of subscribers (the route guard, the session context) can listen
//! without overwriting each other, and publishing with nobody listening is
//! a no-op rather than a lost callback.

use tokio::sync::broadcast;

/// Capacity of the event channel. Events are tiny and consumers react to the
/// first one; lagging receivers just miss duplicates.
const CHANNEL_CAPACITY: usize = 16;

/// Events published when the server rejects established credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A downstream authenticated request came back 401.
    SessionRejected,
}

/// Shared broadcast bus for [`AuthEvent`]s.
#[derive(Clone)]
pub struct AuthEventBus {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEventBus {
    /// Create a new, empty bus.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: AuthEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = AuthEventBus::new();
        bus.publish(AuthEvent::SessionRejected);
    }

    #[tokio::test]
    async fn test_all_subscribers_receive() {
        let bus = AuthEventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(AuthEvent::SessionRejected);

        assert_eq!(a.recv().await.unwrap(), AuthEvent::SessionRejected);
        assert_eq!(b.recv().await.unwrap(), AuthEvent::SessionRejected);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_past_events() {
        let bus = AuthEventBus::new();
        bus.publish(AuthEvent::SessionRejected);

        let mut rx = bus.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
