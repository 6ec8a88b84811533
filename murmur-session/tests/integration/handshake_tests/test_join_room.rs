use murmur_core::{RoomName, SessionAnswer};
use murmur_session::{JoinRequest, SessionConfig, SessionError, join_room};
use std::time::Duration;

use crate::integration::{PASSWORD, init_tracing};
use crate::utils::{ConnectionCall, MOCK_PEER_SECRET, MockConnection, MockSignaling, MockTransport};

fn request(password: &str) -> JoinRequest {
    JoinRequest {
        room: RoomName::from("lobby"),
        password: password.to_owned(),
        username: "alice".to_owned(),
    }
}

fn fast_polling() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_millis(10),
        answer_timeout: Duration::from_secs(5),
    }
}

fn host_answer() -> SessionAnswer {
    SessionAnswer {
        answer: "host-answer".to_owned(),
        candidates: vec!["h1".to_owned(), "h2".to_owned()],
    }
}

#[tokio::test]
async fn test_join_applies_candidates_then_answer() {
    init_tracing();
    let transport = MockTransport::new();
    let signaling = MockSignaling::new(PASSWORD);
    signaling.set_answer(host_answer(), 2).await;

    let membership = join_room(&transport, &signaling, &request(PASSWORD), &fast_polling())
        .await
        .expect("join should succeed");

    assert_eq!(membership.username, "alice");
    assert_eq!(membership.peer_secret.as_str(), MOCK_PEER_SECRET);
    assert_eq!(signaling.answer_polls().await, 3);
    assert_eq!(
        transport.offer_connection().calls().await,
        [
            ConnectionCall::AddCandidate("h1".into()),
            ConnectionCall::AddCandidate("h2".into()),
            ConnectionCall::SetRemoteAnswer("host-answer".into()),
        ]
    );
}

#[tokio::test]
async fn test_join_leaves_offer_with_gathered_candidates() {
    init_tracing();
    let transport = MockTransport::new();
    let signaling = MockSignaling::new(PASSWORD);
    signaling.set_answer(host_answer(), 0).await;

    join_room(&transport, &signaling, &request(PASSWORD), &fast_polling())
        .await
        .unwrap();

    let offers = signaling.offers().await;
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].username, "alice");
    assert_eq!(offers[0].offer, "mock-offer");
    assert_eq!(offers[0].candidates, ["offer-candidate"]);
}

#[tokio::test]
async fn test_wrong_password_ends_the_join() {
    init_tracing();
    let transport = MockTransport::new();
    let signaling = MockSignaling::new(PASSWORD);
    signaling.set_answer(host_answer(), 0).await;

    let result = join_room(&transport, &signaling, &request("wrong"), &fast_polling()).await;

    assert!(matches!(
        result,
        Err(SessionError::Rejected { status: 401, .. })
    ));
    assert_eq!(signaling.answer_polls().await, 0);
    assert!(transport.offer_connection().is_closed().await);
}

#[tokio::test]
async fn test_unusable_answer_ends_the_join() {
    init_tracing();
    let transport = MockTransport::with_offer_connection(MockConnection::rejecting_answers());
    let signaling = MockSignaling::new(PASSWORD);
    signaling.set_answer(host_answer(), 0).await;

    let result = join_room(&transport, &signaling, &request(PASSWORD), &fast_polling()).await;

    assert!(matches!(result, Err(SessionError::RemoteDescription(_))));
    assert!(transport.offer_connection().is_closed().await);
}

#[tokio::test(start_paused = true)]
async fn test_join_gives_up_when_host_never_answers() {
    init_tracing();
    let transport = MockTransport::new();
    let signaling = MockSignaling::new(PASSWORD);
    let config = SessionConfig {
        poll_interval: Duration::from_secs(1),
        answer_timeout: Duration::from_secs(5),
    };

    let result = join_room(&transport, &signaling, &request(PASSWORD), &config).await;

    match result {
        Err(SessionError::AnswerTimeout(waited)) => assert_eq!(waited, Duration::from_secs(5)),
        Err(e) => panic!("expected a timeout, got {}", e),
        Ok(_) => panic!("expected a timeout, got a membership"),
    }
    assert!(signaling.answer_polls().await >= 5);
    assert!(transport.offer_connection().is_closed().await);
}
