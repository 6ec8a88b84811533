mod http_signaling;
mod polling;
mod signaling_client;

pub use http_signaling::*;
pub use polling::*;
pub use signaling_client::*;
