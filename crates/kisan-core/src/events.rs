use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Role, StoredTurnId, UserId};

/// Observable events emitted by the conversation engine.
///
/// Fire-and-forget persistence must never block or fail the visible chat, so
/// its outcomes are reported here instead of being returned to the caller.
/// Consumers (diagnostics panel, log shipper, tests) subscribe via [`EventBus`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SessionEvent {
    /// A turn reached the history store.
    TurnPersisted {
        user_id: UserId,
        role: Role,
        stored_id: StoredTurnId,
    },

    /// A detached persistence task failed. The live chat was not affected.
    PersistFailed {
        user_id: UserId,
        role: Role,
        error: String,
    },

    /// Loading recent history during session initialization failed; the
    /// session proceeded with only the welcome turn.
    HistoryLoadFailed { user_id: UserId, error: String },

    /// An inference call failed and was surfaced as an apology turn.
    InferenceFailed { user_id: UserId, error: String },

    /// The user's persisted history was cleared on explicit request.
    HistoryCleared { user_id: UserId, removed: u64 },
}

impl SessionEvent {
    /// Short name for log lines and event counters.
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::TurnPersisted { .. } => "turn_persisted",
            SessionEvent::PersistFailed { .. } => "persist_failed",
            SessionEvent::HistoryLoadFailed { .. } => "history_load_failed",
            SessionEvent::InferenceFailed { .. } => "inference_failed",
            SessionEvent::HistoryCleared { .. } => "history_cleared",
        }
    }
}

/// Broadcast fan-out for [`SessionEvent`]s.
///
/// Emitting never fails and never blocks: if nobody is subscribed the event
/// is dropped, which is the correct behavior for an observability channel.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus retaining up to `capacity` undelivered events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!(event = event.event_name(), "session event");
        // A send error only means there are no receivers right now.
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        UserId::new("farmer-1")
    }

    #[test]
    fn test_event_names() {
        let cases: Vec<(SessionEvent, &str)> = vec![
            (
                SessionEvent::TurnPersisted {
                    user_id: uid(),
                    role: Role::User,
                    stored_id: StoredTurnId(1),
                },
                "turn_persisted",
            ),
            (
                SessionEvent::PersistFailed {
                    user_id: uid(),
                    role: Role::Model,
                    error: "disk full".to_string(),
                },
                "persist_failed",
            ),
            (
                SessionEvent::HistoryLoadFailed {
                    user_id: uid(),
                    error: "unreachable".to_string(),
                },
                "history_load_failed",
            ),
            (
                SessionEvent::InferenceFailed {
                    user_id: uid(),
                    error: "timeout".to_string(),
                },
                "inference_failed",
            ),
            (
                SessionEvent::HistoryCleared {
                    user_id: uid(),
                    removed: 8,
                },
                "history_cleared",
            ),
        ];
        for (event, name) in cases {
            assert_eq!(event.event_name(), name);
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        // Must not panic or error with zero receivers.
        bus.emit(SessionEvent::HistoryCleared {
            user_id: uid(),
            removed: 0,
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(SessionEvent::PersistFailed {
            user_id: uid(),
            role: Role::User,
            error: "boom".to_string(),
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_name(), "persist_failed");
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_receive() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        bus.emit(SessionEvent::HistoryCleared {
            user_id: uid(),
            removed: 3,
        });
        assert_eq!(rx1.recv().await.unwrap().event_name(), "history_cleared");
        assert_eq!(rx2.recv().await.unwrap().event_name(), "history_cleared");
    }

    #[test]
    fn test_event_serializes() {
        let event = SessionEvent::InferenceFailed {
            user_id: uid(),
            error: "503".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("InferenceFailed"));
        assert!(json.contains("503"));
    }
}
