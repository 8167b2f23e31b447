mod engine;
mod negotiation;
mod session_set;

pub use engine::{EngineError, EngineEvent, PeerConnection, PeerConnectionFactory};
#[cfg(feature = "webrtc-engine")]
pub use engine::{WebRtcConnection, WebRtcEngine};
pub use negotiation::{NegotiationSession, NegotiationState, NegotiationStep, SignalingTransport};
pub use session_set::PeerSessionSet;
