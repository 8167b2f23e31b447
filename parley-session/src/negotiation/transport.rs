use async_trait::async_trait;
use parley_core::{ParticipantId, SignalPayload};

/// Outbound signaling path of a session: whatever carries messages back to
/// the relay (a WebSocket client in production, a channel in tests)
/// implements this.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    async fn send_signal(&self, to: ParticipantId, payload: SignalPayload);
}
