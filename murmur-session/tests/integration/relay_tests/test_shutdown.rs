use murmur_session::{RelayConfig, SessionConfig, spawn_relay};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{
    PASSWORD, create_test_relay, create_test_relay_with, description, host_session, init_tracing,
    wait_for_close,
};
use crate::utils::{MockSignaling, MockTransport};

#[tokio::test]
async fn test_shutdown_closes_every_answered_connection() {
    let relay = create_test_relay(RelayConfig::default());
    relay.connect(&[("a", "alice"), ("b", "bob")]).await;
    let transport = relay.transport.clone();

    relay.handle.shutdown().await;

    for id in ["a", "b"] {
        let connection = transport.answer_connection(id).await.unwrap();
        assert!(connection.is_closed().await, "{} should be closed", id);
    }
}

#[tokio::test]
async fn test_shutdown_closes_connection_still_negotiating() {
    let signaling = MockSignaling::new(PASSWORD);
    signaling.stall_answers().await;
    let relay = create_test_relay_with(RelayConfig::default(), MockTransport::new(), signaling);

    relay.send_snapshot(&[("a", "alice")]).await;
    let connection = relay.wait_for_answer_connection("a").await;
    assert!(!connection.is_closed().await);

    relay.handle.shutdown().await;

    assert!(
        wait_for_close(&connection).await,
        "connection of a cancelled handshake was left open"
    );
}

#[tokio::test]
async fn test_relay_stops_reading_snapshots_after_shutdown() {
    let relay = create_test_relay(RelayConfig::default());
    assert!(relay.handle.peers().await.unwrap().is_empty());

    let snapshots = relay.snapshots.clone();
    relay.handle.shutdown().await;

    assert!(snapshots.send(Default::default()).await.is_err());
}

#[tokio::test]
async fn test_spawned_relay_admits_polled_peers() {
    init_tracing();
    let transport = Arc::new(MockTransport::new());
    let signaling = Arc::new(MockSignaling::new(PASSWORD));
    signaling.add_peer("a", description("alice")).await;
    let config = SessionConfig {
        poll_interval: Duration::from_millis(10),
        ..SessionConfig::default()
    };

    let handle = spawn_relay(
        host_session(),
        RelayConfig::default(),
        &config,
        transport.clone(),
        signaling.clone(),
    );

    let mut answered = false;
    for _ in 0..200 {
        if handle.peers().await.unwrap().iter().any(|p| p.answered) {
            answered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(answered, "polled peer was never answered");

    // Later polls keep listing alice; she must not be answered twice.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.answer_count("a").await, 1);
    assert_eq!(signaling.answers().await.len(), 1);

    handle.shutdown().await;
}
