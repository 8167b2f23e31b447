use crate::utils::mock_engine::{EngineOp, MockEngine};
use crate::utils::session_helpers::spawn_session;
use crate::utils::init_tracing;
use parley_session::NegotiationState;
use std::time::Duration;

#[tokio::test]
async fn close_abandons_the_in_flight_step() {
    init_tracing();

    let engine = MockEngine::new().with_step_delay(Duration::from_millis(300));
    let harness = spawn_session(&engine, false).await;

    harness.session.enqueue_offer();
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.session.close();

    assert_eq!(harness.session.state(), NegotiationState::Closed);
    harness.pc.wait_for_op(EngineOp::Close, 2000).await;

    // The offer was cut off mid-creation, so nothing ever went out.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(harness.transport.sent().await.is_empty());
    assert!(!harness.session.has_pending_steps());
}

#[tokio::test]
async fn steps_after_close_are_dropped() {
    init_tracing();

    let engine = MockEngine::new();
    let harness = spawn_session(&engine, false).await;

    harness.session.close();
    harness.session.enqueue_offer();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let ops = harness.pc.ops().await;
    assert!(
        !ops.contains(&EngineOp::CreateOffer),
        "A closed session must not run queued steps"
    );
    assert_eq!(harness.session.state(), NegotiationState::Closed);
}

#[tokio::test]
async fn close_is_idempotent() {
    init_tracing();

    let engine = MockEngine::new();
    let harness = spawn_session(&engine, false).await;

    harness.session.close();
    harness.session.close();

    assert_eq!(harness.session.state(), NegotiationState::Closed);
}
