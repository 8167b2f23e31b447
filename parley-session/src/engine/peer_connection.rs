use async_trait::async_trait;
use parley_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("peer connection failure: {0}")]
    Connection(String),

    #[error("session description rejected: {0}")]
    Description(String),

    #[error("ICE candidate rejected: {0}")]
    Candidate(String),
}

/// Asynchronous notifications emitted by a peer-connection capability.
#[derive(Debug)]
pub enum EngineEvent {
    /// A locally discovered network path proposal, to be forwarded to the
    /// remote participant immediately.
    LocalCandidate(IceCandidate),

    /// The underlying connection failed or was closed. Fatal for the pair.
    Closed,
}

/// The narrow negotiation surface of a peer-connection engine. The session
/// machinery only ever talks to this interface, so swapping the engine never
/// touches the negotiation logic. Rollback is expressed as setting a local
/// description of the rollback kind.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, EngineError>;

    async fn create_answer(&self) -> Result<SessionDescription, EngineError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn close(&self);
}

#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    /// Builds one capability plus the stream of its asynchronous events.
    async fn create(
        &self,
    ) -> Result<(Arc<dyn PeerConnection>, mpsc::Receiver<EngineEvent>), EngineError>;
}
