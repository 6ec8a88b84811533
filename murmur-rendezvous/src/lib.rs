mod error;
mod http;
mod registry;

pub use error::*;
pub use http::*;
pub use registry::*;
