use std::time::Duration;

/// Timing of the signaling side of a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Pause between two polls of the rendezvous service.
    pub poll_interval: Duration,
    /// How long a joiner waits for the host's answer before giving up.
    pub answer_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            answer_timeout: Duration::from_secs(60),
        }
    }
}
