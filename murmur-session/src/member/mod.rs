mod history;
mod member_loop;

pub use history::*;
pub use member_loop::*;
