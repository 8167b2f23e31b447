use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
    Rollback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }

    /// Rollback carries no SDP body; it only reverts the local side to stable.
    pub fn rollback() -> Self {
        Self {
            kind: SdpKind::Rollback,
            sdp: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// The content of a relayed signal. The relay never looks inside this; it is
/// deserialized only at the negotiating ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalPayload {
    #[serde(rename = "sdp")]
    Sdp(SessionDescription),
    #[serde(rename = "candidate")]
    Candidate(IceCandidate),
}

impl SignalPayload {
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Events a client sends over its signaling connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientEvent {
    Join {
        room: RoomId,
        participant: ParticipantId,
    },
    Signal {
        room: RoomId,
        from: ParticipantId,
        /// Absent means "all other room members".
        to: Option<ParticipantId>,
        payload: serde_json::Value,
    },
    Leave {
        room: RoomId,
        participant: ParticipantId,
    },
}

/// Events the relay sends back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerEvent {
    Participants {
        room: RoomId,
        participants: Vec<ParticipantId>,
    },
    Signal {
        from: ParticipantId,
        payload: serde_json::Value,
    },
    Error {
        message: String,
    },
}
