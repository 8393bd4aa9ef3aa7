use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use aghist_types::Vendor;

#[derive(Parser)]
#[command(name = "aghist")]
#[command(about = "Export AI coding assistant chat history to portable JSON", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Read Cursor data from this directory instead of the local install
    #[arg(long, global = true, value_name = "DIR")]
    pub cursor_root: Option<PathBuf>,

    /// Read Claude Code transcripts from this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub claude_root: Option<PathBuf>,

    /// Read Copilot workspace storage from this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub copilot_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List chats from the installed agents, newest first
    List {
        /// Only list chats from one agent
        #[arg(long)]
        agent: Option<AgentFilter>,
    },

    /// Export chats as vendor-neutral JSON documents
    Export {
        /// Chat ID from `aghist list`
        #[arg(long, conflicts_with = "all")]
        id: Option<String>,

        /// Export every chat from the selected agents into one array
        #[arg(long)]
        all: bool,

        /// Only export chats from one agent
        #[arg(long)]
        agent: Option<AgentFilter>,

        /// Output path (defaults to a file under result/)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Report skipped and unmapped tool names after the export
        #[arg(long)]
        verbose: bool,
    },

    /// Show the supported agents and whether their storage exists
    Agents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum AgentFilter {
    Cursor,
    Claude,
    Copilot,
}

impl AgentFilter {
    pub fn vendor(self) -> Vendor {
        match self {
            AgentFilter::Cursor => Vendor::Cursor,
            AgentFilter::Claude => Vendor::Claude,
            AgentFilter::Copilot => Vendor::Copilot,
        }
    }
}

impl fmt::Display for AgentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vendor().as_str())
    }
}
