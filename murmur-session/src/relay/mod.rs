mod peer_table;
mod relay;
mod relay_command;
mod relay_config;

pub use peer_table::*;
pub use relay::*;
pub use relay_command::*;
pub use relay_config::*;
