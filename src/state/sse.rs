use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`AppState`](super::AppState).
pub struct SseState {
    public: SseHub,
    admin: AdminSseState,
}

impl SseState {
    /// Build the SSE sub-tree with per-stream channel capacities.
    pub fn new(public_capacity: usize, admin_capacity: usize) -> Self {
        Self {
            public: SseHub::new(public_capacity),
            admin: AdminSseState {
                hub: SseHub::new(admin_capacity),
                token: Mutex::new(None),
            },
        }
    }

    /// Hub of the public stream.
    pub fn public(&self) -> &SseHub {
        &self.public
    }

    /// Admin hub and token.
    pub fn admin(&self) -> &AdminSseState {
        &self.admin
    }
}

/// Admin stream hub plus the token handed to its single subscriber.
pub struct AdminSseState {
    hub: SseHub,
    token: Mutex<Option<String>>,
}

impl AdminSseState {
    /// Hub of the admin stream.
    pub fn hub(&self) -> &SseHub {
        &self.hub
    }

    /// `None` until an admin stream is open.
    pub fn token(&self) -> &Mutex<Option<String>> {
        &self.token
    }
}

/// Broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Hub buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// New receiver for future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Serialize `payload` as a named event and broadcast it.
    pub fn broadcast_json<T: Serialize>(&self, name: &str, payload: &T) {
        match ServerEvent::json(Some(name.to_string()), payload) {
            Ok(event) => self.broadcast(event),
            Err(err) => warn!(event = name, error = %err, "failed to serialize SSE payload"),
        }
    }

    /// Number of open streams on this hub.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
