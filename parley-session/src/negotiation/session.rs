use crate::engine::{EngineError, EngineEvent, PeerConnection};
use crate::negotiation::state::NegotiationState;
use crate::negotiation::step::NegotiationStep;
use crate::negotiation::transport::SignalingTransport;
use parley_core::{IceCandidate, ParticipantId, SdpKind, SessionDescription, SignalPayload};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// State observable from outside the worker task. The pending counter is the
/// explicit negotiation-in-flight flag: it counts queued plus executing
/// steps, so "no action currently queued" is a checkable condition rather
/// than something inferred from queue internals.
struct SessionShared {
    state: AtomicU8,
    pending: AtomicUsize,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(NegotiationState::Idle as u8),
            pending: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> NegotiationState {
        NegotiationState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Closed is terminal: a step racing with close() can never resurrect
    /// the pair into an observable non-closed state.
    fn set_state(&self, state: NegotiationState) {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (NegotiationState::from_u8(current) != NegotiationState::Closed)
                    .then_some(state as u8)
            });
    }

    fn pending_steps(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Handle to one peer pair's negotiation machine. The machine itself runs on
/// a dedicated task draining the pair's step queue strictly in FIFO order,
/// so at most one negotiation step is ever in flight for the pair.
pub struct NegotiationSession {
    remote: ParticipantId,
    polite: bool,
    step_tx: mpsc::UnboundedSender<NegotiationStep>,
    close_tx: watch::Sender<bool>,
    shared: Arc<SessionShared>,
}

impl NegotiationSession {
    pub fn new(
        remote: ParticipantId,
        polite: bool,
        pc: Arc<dyn PeerConnection>,
        engine_events: mpsc::Receiver<EngineEvent>,
        transport: Arc<dyn SignalingTransport>,
        fatal_tx: mpsc::UnboundedSender<ParticipantId>,
    ) -> Self {
        let (step_tx, step_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = watch::channel(false);
        let shared = Arc::new(SessionShared::new());

        let worker = SessionWorker {
            remote: remote.clone(),
            polite,
            pc,
            transport: transport.clone(),
            shared: shared.clone(),
            step_rx,
            close_rx: close_rx.clone(),
        };
        tokio::spawn(worker.run());

        tokio::spawn(pump_engine_events(
            remote.clone(),
            engine_events,
            transport,
            close_rx,
            fatal_tx,
        ));

        Self {
            remote,
            polite,
            step_tx,
            close_tx,
            shared,
        }
    }

    pub fn remote(&self) -> &ParticipantId {
        &self.remote
    }

    pub fn is_polite(&self) -> bool {
        self.polite
    }

    pub fn state(&self) -> NegotiationState {
        self.shared.state()
    }

    pub fn has_pending_steps(&self) -> bool {
        self.shared.pending_steps() > 0
    }

    pub fn enqueue_offer(&self) {
        self.enqueue(NegotiationStep::SendOffer);
    }

    pub fn enqueue_remote(&self, payload: SignalPayload) {
        self.enqueue(NegotiationStep::Remote(payload));
    }

    /// Renegotiation trigger: only a settled pair with nothing queued or
    /// executing gets a fresh offer. Returns whether one was enqueued.
    pub fn renegotiate(&self) -> bool {
        if self.state() != NegotiationState::Stable || self.has_pending_steps() {
            return false;
        }
        self.enqueue_offer();
        true
    }

    /// Tears the pair down. Any in-flight step is abandoned at its next
    /// suspension point; nothing runs for this pair afterwards.
    pub fn close(&self) {
        self.shared.set_state(NegotiationState::Closed);
        let _ = self.close_tx.send(true);
    }

    fn enqueue(&self, step: NegotiationStep) {
        if self.state() == NegotiationState::Closed {
            debug!("Dropping step for closed session with {}", self.remote);
            return;
        }
        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if self.step_tx.send(step).is_err() {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Local ICE candidates are independent, order-insensitive events: they skip
/// the step queue and go straight out, still addressed to the pair's remote.
/// A fatal engine closure is reported to the owning session set instead.
async fn pump_engine_events(
    remote: ParticipantId,
    mut events: mpsc::Receiver<EngineEvent>,
    transport: Arc<dyn SignalingTransport>,
    mut close_rx: watch::Receiver<bool>,
    fatal_tx: mpsc::UnboundedSender<ParticipantId>,
) {
    loop {
        tokio::select! {
            _ = close_rx.changed() => break,
            event = events.recv() => match event {
                Some(EngineEvent::LocalCandidate(candidate)) => {
                    transport
                        .send_signal(remote.clone(), SignalPayload::Candidate(candidate))
                        .await;
                }
                Some(EngineEvent::Closed) => {
                    let _ = fatal_tx.send(remote.clone());
                    break;
                }
                None => break,
            },
        }
    }
}

struct SessionWorker {
    remote: ParticipantId,
    polite: bool,
    pc: Arc<dyn PeerConnection>,
    transport: Arc<dyn SignalingTransport>,
    shared: Arc<SessionShared>,
    step_rx: mpsc::UnboundedReceiver<NegotiationStep>,
    close_rx: watch::Receiver<bool>,
}

impl SessionWorker {
    async fn run(mut self) {
        debug!("Negotiation loop started for {}", self.remote);

        loop {
            let step = tokio::select! {
                _ = self.close_rx.changed() => break,
                step = self.step_rx.recv() => match step {
                    Some(step) => step,
                    None => break,
                },
            };

            if *self.close_rx.borrow() {
                self.shared.pending.fetch_sub(1, Ordering::SeqCst);
                break;
            }

            let mut close_rx = self.close_rx.clone();
            tokio::select! {
                _ = close_rx.changed() => {
                    self.shared.pending.fetch_sub(1, Ordering::SeqCst);
                    break;
                }
                result = self.run_step(step) => {
                    self.shared.pending.fetch_sub(1, Ordering::SeqCst);
                    // A failed step never aborts the queue.
                    if let Err(e) = result {
                        warn!("Negotiation step failed for {}: {}", self.remote, e);
                    }
                }
            }
        }

        self.shared.set_state(NegotiationState::Closed);
        self.pc.close().await;
        debug!("Negotiation loop finished for {}", self.remote);
    }

    async fn run_step(&self, step: NegotiationStep) -> Result<(), EngineError> {
        match step {
            NegotiationStep::SendOffer => self.send_offer().await,
            NegotiationStep::Remote(SignalPayload::Sdp(desc)) => match desc.kind {
                SdpKind::Offer => self.handle_remote_offer(desc).await,
                SdpKind::Answer => self.handle_remote_answer(desc).await,
                // Peers never send rollback over the wire.
                SdpKind::Rollback => Ok(()),
            },
            NegotiationStep::Remote(SignalPayload::Candidate(candidate)) => {
                self.handle_remote_candidate(candidate).await
            }
        }
    }

    async fn send_offer(&self) -> Result<(), EngineError> {
        let offer = self.pc.create_offer().await?;
        self.pc.set_local_description(offer.clone()).await?;
        self.shared.set_state(NegotiationState::HaveLocalOffer);
        self.transport
            .send_signal(self.remote.clone(), SignalPayload::Sdp(offer))
            .await;
        Ok(())
    }

    async fn handle_remote_offer(&self, offer: SessionDescription) -> Result<(), EngineError> {
        if self.shared.state() == NegotiationState::HaveLocalOffer {
            if !self.polite {
                // Glare: the impolite side keeps its own pending offer.
                debug!("Discarding glare offer from {}", self.remote);
                return Ok(());
            }
            debug!("Rolling back local offer for {}", self.remote);
            self.pc
                .set_local_description(SessionDescription::rollback())
                .await?;
            self.shared.set_state(NegotiationState::Stable);
        }

        self.pc.set_remote_description(offer).await?;
        self.shared.set_state(NegotiationState::HaveRemoteOffer);

        let answer = self.pc.create_answer().await?;
        self.pc.set_local_description(answer.clone()).await?;
        self.shared.set_state(NegotiationState::Stable);

        self.transport
            .send_signal(self.remote.clone(), SignalPayload::Sdp(answer))
            .await;
        Ok(())
    }

    async fn handle_remote_answer(&self, answer: SessionDescription) -> Result<(), EngineError> {
        self.pc.set_remote_description(answer).await?;
        self.shared.set_state(NegotiationState::Stable);
        Ok(())
    }

    async fn handle_remote_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        // Candidates racing ahead of the remote description are an expected
        // transient; swallowing the failure is the correct behavior.
        if let Err(e) = self.pc.add_ice_candidate(candidate).await {
            debug!("Ignoring ICE candidate failure for {}: {}", self.remote, e);
        }
        Ok(())
    }
}
