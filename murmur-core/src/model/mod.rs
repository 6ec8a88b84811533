mod peer;
mod room;
mod signaling;

pub use peer::PeerId;
pub use room::{HostSecret, PeerSecret, RoomName};
pub use signaling::{PeerDescription, SessionAnswer};
