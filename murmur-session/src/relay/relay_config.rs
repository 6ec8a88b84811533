/// Relay policy knobs.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Echo a message back to the peer that sent it.
    pub include_sender: bool,
    /// Stop admitting peers once this many are in the table. Peers whose
    /// handshake failed do not count.
    pub max_peers: Option<usize>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            include_sender: true,
            max_peers: None,
        }
    }
}
