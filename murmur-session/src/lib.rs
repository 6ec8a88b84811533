mod error;
mod handshake;
mod member;
mod relay;
mod signaling;
mod transport;

pub use error::*;
pub use handshake::*;
pub use member::*;
pub use relay::*;
pub use signaling::*;
pub use transport::*;
