mod participant;
mod room;
mod signaling;

pub use participant::{ConnectionId, Participant, ParticipantId};
pub use room::RoomId;
pub use signaling::{
    ClientEvent, IceCandidate, SdpKind, ServerEvent, SessionDescription, SignalPayload,
};
