mod peer_connection;
#[cfg(feature = "webrtc-engine")]
mod webrtc_engine;

pub use peer_connection::{EngineError, EngineEvent, PeerConnection, PeerConnectionFactory};
#[cfg(feature = "webrtc-engine")]
pub use webrtc_engine::{WebRtcConnection, WebRtcEngine};
