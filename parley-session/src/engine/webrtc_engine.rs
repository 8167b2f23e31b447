use crate::engine::peer_connection::{EngineError, EngineEvent, PeerConnection, PeerConnectionFactory};
use async_trait::async_trait;
use parley_core::{IceCandidate, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Factory producing `webrtc`-rs backed capabilities.
#[derive(Debug, Clone, Default)]
pub struct WebRtcEngine {
    ice_servers: Vec<String>,
}

impl WebRtcEngine {
    pub fn new(ice_servers: Vec<String>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl PeerConnectionFactory for WebRtcEngine {
    async fn create(
        &self,
    ) -> Result<(Arc<dyn PeerConnection>, mpsc::Receiver<EngineEvent>), EngineError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if self.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(config)
                .await
                .map_err(|e| EngineError::Connection(e.to_string()))?,
        );

        let (event_tx, event_rx) = mpsc::channel(64);

        let candidate_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(EngineEvent::LocalCandidate(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    }))
                    .await;
            })
        }));

        let state_tx = event_tx;
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                debug!("Peer connection state changed: {:?}", s);
                match s {
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(EngineEvent::Closed).await;
                    }
                    _ => {}
                }
            })
        }));

        Ok((Arc::new(WebRtcConnection { pc }), event_rx))
    }
}

/// One `webrtc`-rs peer connection behind the capability interface.
pub struct WebRtcConnection {
    pc: Arc<RTCPeerConnection>,
}

impl WebRtcConnection {
    fn to_rtc_description(desc: &SessionDescription) -> Result<RTCSessionDescription, EngineError> {
        match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone())
                .map_err(|e| EngineError::Description(e.to_string())),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone())
                .map_err(|e| EngineError::Description(e.to_string())),
            SdpKind::Rollback => {
                let mut rtc_desc = RTCSessionDescription::default();
                rtc_desc.sdp_type = RTCSdpType::Rollback;
                Ok(rtc_desc)
            }
        }
    }
}

#[async_trait]
impl PeerConnection for WebRtcConnection {
    async fn create_offer(&self) -> Result<SessionDescription, EngineError> {
        let offer = self
            .pc
            .create_offer(None)
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, EngineError> {
        let answer = self
            .pc
            .create_answer(None)
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        let rtc_desc = Self::to_rtc_description(&desc)?;
        self.pc
            .set_local_description(rtc_desc)
            .await
            .map_err(|e| EngineError::Description(e.to_string()))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        if desc.kind == SdpKind::Rollback {
            return Err(EngineError::Description(
                "rollback is a local-only transition".to_string(),
            ));
        }
        let rtc_desc = Self::to_rtc_description(&desc)?;
        self.pc
            .set_remote_description(rtc_desc)
            .await
            .map_err(|e| EngineError::Description(e.to_string()))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: None,
            })
            .await
            .map_err(|e| EngineError::Candidate(e.to_string()))
    }

    async fn close(&self) {
        let _ = self.pc.close().await;
    }
}
