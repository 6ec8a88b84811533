pub mod mock_transport;

pub use mock_signaling::*;
pub use mock_transport::*;
pub use recording_view::*;
pub use test_rendezvous::*;
