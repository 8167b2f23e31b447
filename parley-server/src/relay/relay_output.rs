use async_trait::async_trait;
use parley_core::{ConnectionId, ServerEvent};

/// Outbound side of the relay: whatever owns the client connections
/// (the WebSocket service in production, a mock in tests) implements this
/// so the relay task can push events to a specific connection.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    async fn deliver(&self, connection: ConnectionId, event: ServerEvent);
}
