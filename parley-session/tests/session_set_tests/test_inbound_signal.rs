use crate::utils::mock_engine::MockEngine;
use crate::utils::mock_transport::MockTransport;
use crate::utils::{init_tracing, wait_until};
use parley_core::{ParticipantId, RoomId, SessionDescription, SignalPayload};
use parley_session::{NegotiationState, PeerSessionSet};
use std::sync::Arc;

#[tokio::test]
async fn signal_from_unknown_peer_creates_a_receiving_session() {
    init_tracing();

    let engine = Arc::new(MockEngine::new());
    let transport = MockTransport::new();
    let set = PeerSessionSet::new(
        ParticipantId::from("u2"),
        RoomId::from("room"),
        engine.clone(),
        Arc::new(transport.clone()),
    );

    let from = ParticipantId::from("u1");
    set.handle_signal(
        from.clone(),
        SignalPayload::Sdp(SessionDescription::offer("v=0 remote")),
    )
    .await;

    assert!(set.contains(&from));

    // The receiving side answers without ever offering.
    let sent = transport.wait_for_sent(1, 2000).await;
    assert_eq!(
        sent,
        vec![(
            from.clone(),
            SignalPayload::Sdp(SessionDescription::answer("v=0 mock"))
        )]
    );
    wait_until("the pair settles", 2000, || {
        set.state_of(&from) == Some(NegotiationState::Stable)
    })
    .await;
}

#[tokio::test]
async fn signal_from_self_is_ignored() {
    init_tracing();

    let engine = Arc::new(MockEngine::new());
    let transport = MockTransport::new();
    let set = PeerSessionSet::new(
        ParticipantId::from("u1"),
        RoomId::from("room"),
        engine.clone(),
        Arc::new(transport.clone()),
    );

    set.handle_signal(
        ParticipantId::from("u1"),
        SignalPayload::Sdp(SessionDescription::offer("v=0 remote")),
    )
    .await;

    assert_eq!(set.session_count(), 0);
    assert_eq!(engine.connection_count().await, 0);
}
