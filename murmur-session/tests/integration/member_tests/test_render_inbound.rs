use murmur_core::PeerId;
use murmur_session::{HOST_PEER, MessageHistory, TransportEvent, render_inbound};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::integration::init_tracing;
use crate::utils::{RecordingChannel, RecordingView};

fn from_host(text: &str) -> TransportEvent {
    TransportEvent::Message(PeerId::from(HOST_PEER), text.to_owned())
}

#[tokio::test]
async fn test_inbound_messages_are_appended_in_order() {
    init_tracing();
    let (events_tx, events) = mpsc::channel(8);
    let history = Arc::new(Mutex::new(MessageHistory::new()));
    let view = Arc::new(RecordingView::default());

    events_tx.send(from_host("alice: m1")).await.unwrap();
    events_tx.send(from_host("bob: m2")).await.unwrap();
    events_tx.send(from_host("alice: m3")).await.unwrap();
    drop(events_tx);

    render_inbound(events, history.clone(), view.clone()).await;

    assert_eq!(
        history.lock().await.lines(),
        ["alice: m1", "bob: m2", "alice: m3"]
    );
    let frames = view.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], ["alice: m1"]);
    assert_eq!(frames[2], ["alice: m1", "bob: m2", "alice: m3"]);
}

#[tokio::test]
async fn test_channel_open_redraws_and_disconnect_is_reported() {
    init_tracing();
    let (events_tx, events) = mpsc::channel(8);
    let history = Arc::new(Mutex::new(MessageHistory::new()));
    let view = Arc::new(RecordingView::default());

    events_tx
        .send(TransportEvent::ChannelOpen(
            PeerId::from(HOST_PEER),
            Arc::new(RecordingChannel::default()),
        ))
        .await
        .unwrap();
    events_tx
        .send(TransportEvent::Disconnected(PeerId::from(HOST_PEER)))
        .await
        .unwrap();
    drop(events_tx);

    render_inbound(events, history.clone(), view.clone()).await;

    assert_eq!(view.frames().len(), 1);
    assert_eq!(view.errors().len(), 1);
    assert!(history.lock().await.is_empty());
}
