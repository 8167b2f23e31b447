use crate::engine::{EngineError, PeerConnectionFactory};
use crate::negotiation::{NegotiationSession, NegotiationState, SignalingTransport};
use dashmap::DashMap;
use parley_core::{ParticipantId, RoomId, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Per-participant mapping of remote peer to negotiation session. Reacts to
/// room membership updates and to inbound signals from peers not seen
/// before; owns every session it creates.
pub struct PeerSessionSet {
    local: ParticipantId,
    room: RoomId,
    sessions: Arc<DashMap<ParticipantId, NegotiationSession>>,
    factory: Arc<dyn PeerConnectionFactory>,
    transport: Arc<dyn SignalingTransport>,
    fatal_tx: mpsc::UnboundedSender<ParticipantId>,
}

impl PeerSessionSet {
    pub fn new(
        local: ParticipantId,
        room: RoomId,
        factory: Arc<dyn PeerConnectionFactory>,
        transport: Arc<dyn SignalingTransport>,
    ) -> Self {
        let sessions: Arc<DashMap<ParticipantId, NegotiationSession>> = Arc::new(DashMap::new());
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();

        // Fatal peer-connection closures only tear down their own pair.
        let reaper_sessions = sessions.clone();
        tokio::spawn(async move {
            while let Some(remote) = fatal_rx.recv().await {
                if let Some((_, session)) = reaper_sessions.remove(&remote) {
                    warn!("Peer connection failed for {}, dropping session", remote);
                    session.close();
                }
            }
        });

        Self {
            local,
            room,
            sessions,
            factory,
            transport,
            fatal_tx,
        }
    }

    pub fn local(&self) -> &ParticipantId {
        &self.local
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn contains(&self, remote: &ParticipantId) -> bool {
        self.sessions.contains_key(remote)
    }

    pub fn state_of(&self, remote: &ParticipantId) -> Option<NegotiationState> {
        self.sessions.get(remote).map(|s| s.state())
    }

    /// Diffs a fresh room participant list against the known sessions.
    /// Newly listed peers get an initiating session (the side reacting to a
    /// membership update sends the offer; simultaneous initiators are
    /// resolved by politeness). Peers no longer listed are torn down.
    pub async fn apply_participants(&self, participants: &[ParticipantId]) {
        for remote in participants {
            if remote == &self.local || self.sessions.contains_key(remote) {
                continue;
            }
            match self.create_session(remote.clone()).await {
                Ok(session) => {
                    info!("Initiating negotiation with {}", remote);
                    session.enqueue_offer();
                    self.sessions.insert(remote.clone(), session);
                }
                Err(e) => error!("Failed to create peer connection for {}: {}", remote, e),
            }
        }

        let departed: Vec<ParticipantId> = self
            .sessions
            .iter()
            .filter(|entry| !participants.contains(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        for remote in departed {
            if let Some((_, session)) = self.sessions.remove(&remote) {
                info!("{} left, closing negotiation session", remote);
                session.close();
            }
        }
    }

    /// Routes an inbound signal to its pair's queue, creating a
    /// receiving-role session on demand for a peer seen for the first time.
    pub async fn handle_signal(&self, from: ParticipantId, payload: SignalPayload) {
        if from == self.local {
            return;
        }

        if !self.sessions.contains_key(&from) {
            match self.create_session(from.clone()).await {
                Ok(session) => {
                    info!("Inbound signal from new peer {}", from);
                    self.sessions.insert(from.clone(), session);
                }
                Err(e) => {
                    error!("Failed to create peer connection for {}: {}", from, e);
                    return;
                }
            }
        }

        if let Some(session) = self.sessions.get(&from) {
            session.enqueue_remote(payload);
        }
    }

    /// Local track changes: re-offer every settled pair. Pairs with a step
    /// queued or executing are skipped by the session's own guard.
    pub fn local_media_changed(&self) {
        for session in self.sessions.iter() {
            session.renegotiate();
        }
    }

    /// Leaving the room tears down every pair.
    pub fn leave(&self) {
        info!("Leaving room {}, closing {} sessions", self.room, self.sessions.len());
        for entry in self.sessions.iter() {
            entry.value().close();
        }
        self.sessions.clear();
    }

    async fn create_session(&self, remote: ParticipantId) -> Result<NegotiationSession, EngineError> {
        let (pc, events) = self.factory.create().await?;
        let polite = self.local.is_polite_toward(&remote);
        Ok(NegotiationSession::new(
            remote,
            polite,
            pc,
            events,
            self.transport.clone(),
            self.fatal_tx.clone(),
        ))
    }
}
