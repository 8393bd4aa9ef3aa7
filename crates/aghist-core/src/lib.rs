pub mod diff;
pub mod id;
pub mod path;
pub mod time;

pub use diff::*;
pub use id::*;
pub use path::*;
pub use time::*;
