use crate::utils::mock_engine::{EngineOp, MockEngine};
use crate::utils::relay_bridge::{create_room, join_client, spawn_relay};
use crate::utils::{init_tracing, wait_until};
use parley_core::{IceCandidate, ParticipantId};
use parley_session::{EngineEvent, NegotiationState};
use std::sync::Arc;

/// Both sides join, both initiate on the membership update, and the
/// politeness tie-break untangles the resulting glare without help.
#[tokio::test]
async fn two_peers_reach_stable_through_the_relay() {
    init_tracing();

    let (cmd_tx, output) = spawn_relay();
    let room = create_room(&cmd_tx).await;

    let engine1 = Arc::new(MockEngine::new());
    let engine2 = Arc::new(MockEngine::new());

    let set1 = join_client(&cmd_tx, &output, &room, "u1", engine1.clone()).await;
    let set2 = join_client(&cmd_tx, &output, &room, "u2", engine2.clone()).await;

    let u1 = ParticipantId::from("u1");
    let u2 = ParticipantId::from("u2");

    wait_until("both pairs settle", 5000, || {
        set1.state_of(&u2) == Some(NegotiationState::Stable)
            && set2.state_of(&u1) == Some(NegotiationState::Stable)
    })
    .await;

    assert_eq!(set1.session_count(), 1);
    assert_eq!(set2.session_count(), 1);

    // A candidate discovered on u1's side must land in u2's engine.
    let candidate = IceCandidate {
        candidate: "candidate:e2e".to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_m_line_index: Some(0),
    };
    engine1
        .connection(0)
        .await
        .emit(EngineEvent::LocalCandidate(candidate.clone()))
        .await;
    engine2
        .connection(0)
        .await
        .wait_for_op(EngineOp::AddCandidate(candidate), 5000)
        .await;
}

#[tokio::test]
async fn peer_departure_tears_down_the_session() {
    init_tracing();

    let (cmd_tx, output) = spawn_relay();
    let room = create_room(&cmd_tx).await;

    let engine1 = Arc::new(MockEngine::new());
    let engine2 = Arc::new(MockEngine::new());

    let set1 = join_client(&cmd_tx, &output, &room, "u1", engine1.clone()).await;
    let set2 = join_client(&cmd_tx, &output, &room, "u2", engine2.clone()).await;

    let u1 = ParticipantId::from("u1");
    let u2 = ParticipantId::from("u2");
    wait_until("both pairs settle", 5000, || {
        set1.state_of(&u2) == Some(NegotiationState::Stable)
            && set2.state_of(&u1) == Some(NegotiationState::Stable)
    })
    .await;

    cmd_tx
        .send(parley_server::RelayCommand::Leave {
            room: room.clone(),
            participant: u2.clone(),
        })
        .await
        .expect("relay task is gone");

    wait_until("the departed peer's session is closed", 5000, || {
        set1.session_count() == 0
    })
    .await;
    engine1
        .connection(0)
        .await
        .wait_for_op(EngineOp::Close, 5000)
        .await;
}
