use parley_core::{ConnectionId, ParticipantId, RoomId};
use tokio::sync::oneshot;

/// Commands entering the relay task from the WebSocket handlers and the
/// room side-channel endpoints.
#[derive(Debug)]
pub enum RelayCommand {
    /// Mint a fresh empty room. Always succeeds.
    CreateRoom { reply: oneshot::Sender<RoomId> },

    /// Existence check for a room identifier.
    ValidateRoom {
        room: RoomId,
        reply: oneshot::Sender<bool>,
    },

    /// A participant asks to enter a room over the given connection.
    Join {
        room: RoomId,
        participant: ParticipantId,
        connection: ConnectionId,
    },

    /// A negotiation message to forward. The payload is opaque here.
    Signal {
        room: RoomId,
        from: ParticipantId,
        to: Option<ParticipantId>,
        payload: serde_json::Value,
    },

    /// An explicit departure from a room.
    Leave {
        room: RoomId,
        participant: ParticipantId,
    },

    /// Transport-level teardown of a connection (no protocol message).
    Disconnect { connection: ConnectionId },
}
