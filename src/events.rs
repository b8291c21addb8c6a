//! Client event notifications
//!
//! Host applications subscribe through a broadcast channel of typed events.
//! Delivery is synchronous and in-process; subscribers that join late do not
//! replay events emitted before they subscribed.

use tokio::sync::broadcast;

use crate::error::ApiError;

const CHANNEL_CAPACITY: usize = 32;

/// Token data delivered with a refresh event
#[derive(Debug, Clone)]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until the new access token expires
    pub expires_in: i64,
}

/// Events emitted over the client's lifetime
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Fires once after the initial token or profile fetch completes
    Ready,
    /// Fires with the new token whenever a refresh succeeds
    TokenRefreshed(TokenPayload),
    /// Fires with the error payload on any failing API response
    Error(ApiError),
}

/// Broadcast bus for client events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns a receiver for client events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emits an event to all current subscribers
    ///
    /// Emission never fails; events are dropped when nobody is listening.
    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
