use std::time::Duration;

/// Configuration for WebRTC
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// STUN/TURN urls. Empty means host candidates only.
    pub ice_servers: Vec<String>,
    /// Upper bound on waiting for ICE gathering to complete.
    pub gathering_timeout: Duration,
    /// Label of the data channel the joining side opens.
    pub channel_label: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun1.l.google.com:19302".to_owned()],
            gathering_timeout: Duration::from_secs(5),
            channel_label: "chat".to_owned(),
        }
    }
}

impl TransportConfig {
    /// No STUN servers, short gathering window. Enough for peers on one machine.
    pub fn local() -> Self {
        Self {
            ice_servers: vec![],
            gathering_timeout: Duration::from_secs(3),
            ..Self::default()
        }
    }
}
