//! Event system for layout notifications
//!
//! A broadcast bus that mirrors coordinator transitions to consumers that
//! prefer a channel over a callback (WebSocket bridges, the CLI).

pub mod types;

pub use types::LayoutEvent;

use tokio::sync::broadcast;

/// Event channel capacity (ring buffer size)
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Broadcast bus for layout events
///
/// ```no_run
/// use harthio_layout::device::DeviceDescriptor;
/// use harthio_layout::events::{EventBus, LayoutEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(LayoutEvent::TransitionEnded {
///     current: DeviceDescriptor::server_default(),
/// });
///
/// tokio::spawn(async move {
///     while let Ok(event) = rx.recv().await {
///         println!("{}", event.name());
///     }
/// });
/// ```
pub struct EventBus {
    tx: broadcast::Sender<LayoutEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub fn publish(&self, event: LayoutEvent) {
        let _ = self.tx.send(event);
    }

    /// Receive all future events
    ///
    /// A subscriber that falls behind by more than the ring buffer gets a
    /// `Lagged` error and misses events.
    pub fn subscribe(&self) -> broadcast::Receiver<LayoutEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceDescriptor;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(LayoutEvent::DescriptorRefreshed {
            current: DeviceDescriptor::server_default(),
        });

        assert!(matches!(rx1.recv().await.unwrap(), LayoutEvent::DescriptorRefreshed { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), LayoutEvent::DescriptorRefreshed { .. }));
    }

    #[test]
    fn test_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(LayoutEvent::SubscriberFailed {
            subscriber_id: 1,
            message: "boom".to_string(),
        });
    }
}
