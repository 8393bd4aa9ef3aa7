pub mod agents;
pub mod export;
pub mod list;
