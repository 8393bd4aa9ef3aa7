pub mod export;
pub mod tool;
pub mod vendor;

pub use export::*;
pub use tool::*;
pub use vendor::*;
