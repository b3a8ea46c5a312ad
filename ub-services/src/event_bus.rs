//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels to decouple services from one another.
//! Any service can emit events without knowing who is listening, and any
//! number of subscribers can independently consume events.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Application-level events.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The signed-in identity changed (`None` after sign-out).
    SessionChanged {
        identity: Option<String>,
    },
    /// A chat was opened, creating it if needed.
    ChatOpened {
        sender: String,
        receiver: String,
        created: bool,
    },
    /// A chat was deleted on the backend.
    ChatDeleted {
        chat_id: String,
    },
    /// The backend accepted a message.
    MessageSent {
        chat_id: String,
        is_image: bool,
    },
    /// A panic alert reached the backend.
    AlertDispatched {
        email: String,
    },
    /// A panic alert could not be delivered.
    AlertFailed {
        email: String,
        error: String,
    },
    /// The station list was refreshed.
    StationsLoaded {
        count: usize,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Every subscriber gets every event. Slow subscribers that fall behind
/// receive a `Lagged` error and miss events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::SessionChanged { .. } => "SessionChanged",
        AppEvent::ChatOpened { .. } => "ChatOpened",
        AppEvent::ChatDeleted { .. } => "ChatDeleted",
        AppEvent::MessageSent { .. } => "MessageSent",
        AppEvent::AlertDispatched { .. } => "AlertDispatched",
        AppEvent::AlertFailed { .. } => "AlertFailed",
        AppEvent::StationsLoaded { .. } => "StationsLoaded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::ChatDeleted {
            chat_id: "chat-1".into(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            AppEvent::ChatDeleted {
                chat_id: "chat-1".into()
            }
        );
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(AppEvent::StationsLoaded { count: 7 });

        assert_eq!(rx1.recv().await.unwrap(), AppEvent::StationsLoaded { count: 7 });
        assert_eq!(rx2.recv().await.unwrap(), AppEvent::StationsLoaded { count: 7 });
    }

    #[test]
    fn test_event_bus_no_subscribers() {
        let bus = EventBus::new(16);
        bus.emit(AppEvent::SessionChanged { identity: None });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_labels() {
        assert_eq!(
            event_label(&AppEvent::AlertFailed {
                email: String::new(),
                error: String::new(),
            }),
            "AlertFailed"
        );
    }
}
