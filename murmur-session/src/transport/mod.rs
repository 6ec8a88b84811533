mod connection;
mod connection_wrapper;
mod transport_config;
mod transport_event;

pub use connection::*;
pub use connection_wrapper::*;
pub use transport_config::*;
pub use transport_event::*;
