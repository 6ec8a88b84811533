use murmur_session::RelayConfig;

use crate::integration::{PASSWORD, create_test_relay, create_test_relay_with};
use crate::utils::{MockSignaling, MockTransport};

#[tokio::test]
async fn test_peers_beyond_the_cap_are_refused() {
    let relay = create_test_relay(RelayConfig {
        max_peers: Some(2),
        ..RelayConfig::default()
    });

    relay
        .send_snapshot(&[("a", "alice"), ("b", "bob"), ("c", "carol")])
        .await;
    relay.wait_for_answered(&["a", "b"]).await;
    relay
        .send_snapshot(&[("a", "alice"), ("b", "bob"), ("c", "carol"), ("d", "dave")])
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let peers = relay.handle.peers().await.unwrap();
    let usernames: Vec<&str> = peers.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(usernames, ["alice", "bob"]);
    assert_eq!(relay.transport.answer_count("c").await, 0);
    assert_eq!(relay.transport.answer_count("d").await, 0);
    relay.handle.shutdown().await;
}

#[tokio::test]
async fn test_no_cap_by_default() {
    let relay = create_test_relay(RelayConfig::default());
    let ids = ["p1", "p2", "p3", "p4", "p5", "p6"];
    let peers: Vec<(&str, &str)> = ids.iter().map(|id| (*id, *id)).collect();

    relay.send_snapshot(&peers).await;
    let admitted = relay.wait_for_answered(&ids).await;

    assert_eq!(admitted.len(), 6);
    relay.handle.shutdown().await;
}

#[tokio::test]
async fn test_failed_handshakes_do_not_use_up_the_cap() {
    let transport = MockTransport::new();
    transport.fail_answers_for("a").await;
    let relay = create_test_relay_with(
        RelayConfig {
            max_peers: Some(1),
            ..RelayConfig::default()
        },
        transport,
        MockSignaling::new(PASSWORD),
    );

    relay.send_snapshot(&[("a", "alice")]).await;
    relay
        .wait_for_peers(|peers| peers.iter().any(|p| p.peer_id.as_str() == "a" && p.failed))
        .await;

    relay.send_snapshot(&[("a", "alice"), ("b", "bob")]).await;
    let peers = relay.wait_for_answered(&["b"]).await;

    let usernames: Vec<&str> = peers.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(usernames, ["alice", "bob"]);
    assert_eq!(relay.transport.answer_count("a").await, 1);
    relay.handle.shutdown().await;
}
