mod host;
mod join;
mod session_config;

pub use host::*;
pub use join::*;
pub use session_config::*;
