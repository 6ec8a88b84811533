use crate::SessionError;
use crate::handshake::Membership;
use crate::member::MessageHistory;
use crate::transport::TransportEvent;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

/// Where a member's chat is displayed.
pub trait ChatView: Send + Sync {
    /// Show the whole history again, followed by the input prompt.
    fn redraw(&self, history: &MessageHistory);

    /// Tell the local user something went wrong without ending the session.
    fn report_error(&self, message: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemberConfig {
    /// Add our own lines to the history right away instead of waiting for the
    /// host to echo them back.
    pub local_echo: bool,
}

pub fn format_message(username: &str, text: &str) -> String {
    format!("{}: {}", username, text)
}

/// Append every inbound message to `history` and redraw. Returns when the
/// event stream ends.
pub async fn render_inbound(
    mut events: mpsc::Receiver<TransportEvent>,
    history: Arc<Mutex<MessageHistory>>,
    view: Arc<dyn ChatView>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::ChannelOpen(_, _) => {
                info!("Channel to the host is open");
                view.redraw(&*history.lock().await);
            }

            TransportEvent::Message(_, text) => {
                let mut history = history.lock().await;
                history.push(text);
                view.redraw(&history);
            }

            TransportEvent::Disconnected(_) => {
                view.report_error("Connection to the host was lost");
            }
        }
    }
}

/// Interactive loop of a joined member: renders inbound messages as they
/// arrive and sends every non-empty input line as `username: line`.
///
/// Ends when `input` ends and returns what was displayed. Send failures are
/// reported to the view and the loop carries on.
pub async fn run_member<S>(
    membership: Membership,
    mut input: S,
    view: Arc<dyn ChatView>,
    config: MemberConfig,
) -> Result<MessageHistory, SessionError>
where
    S: Stream<Item = std::io::Result<String>> + Unpin,
{
    let Membership {
        username,
        connection,
        channel,
        events,
        ..
    } = membership;

    let history = Arc::new(Mutex::new(MessageHistory::new()));
    let receiver = tokio::spawn(render_inbound(
        events,
        Arc::clone(&history),
        Arc::clone(&view),
    ));

    view.redraw(&*history.lock().await);

    let result = loop {
        let line = match input.next().await {
            Some(Ok(line)) => line,
            None => break Ok(()),
            Some(Err(e)) => break Err(SessionError::Io(e)),
        };

        if line.trim().is_empty() {
            continue;
        }
        let text = line.trim_end_matches(['\r', '\n']);

        let message = format_message(&username, text);
        if let Err(e) = channel.send_text(&message).await {
            view.report_error(&format!("Failed to send message: {:#}", e));
            continue;
        }
        debug!("Sent {} bytes", message.len());

        if config.local_echo {
            let mut history = history.lock().await;
            history.push(message);
            view.redraw(&history);
        }
    };

    receiver.abort();
    let _ = connection.close().await;
    info!("'{}' left the room", username);

    let history = history.lock().await.clone();
    result.map(|_| history)
}
