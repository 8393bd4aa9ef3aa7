mod args;
mod commands;
mod handlers;

pub use args::{AgentFilter, Cli, Commands};
pub use commands::run;
