use std::path::PathBuf;

use anyhow::Result;

use aghist_providers::{ChatProvider, create_provider};
use aghist_types::Vendor;

use crate::args::{AgentFilter, Cli, Commands};
use crate::handlers;

/// Storage-root overrides from the global flags, keyed by vendor.
pub(crate) struct RootOverrides {
    cursor: Option<PathBuf>,
    claude: Option<PathBuf>,
    copilot: Option<PathBuf>,
}

impl RootOverrides {
    pub(crate) fn for_vendor(&self, vendor: Vendor) -> Option<PathBuf> {
        match vendor {
            Vendor::Cursor => self.cursor.clone(),
            Vendor::Claude => self.claude.clone(),
            Vendor::Copilot => self.copilot.clone(),
        }
    }

    /// Providers for the selected agent, or for every agent in
    /// [`Vendor::ALL`] order when no filter is given.
    pub(crate) fn providers(&self, agent: Option<AgentFilter>) -> Vec<Box<dyn ChatProvider>> {
        let vendors: Vec<Vendor> = match agent {
            Some(filter) => vec![filter.vendor()],
            None => Vendor::ALL.to_vec(),
        };
        vendors
            .into_iter()
            .map(|vendor| create_provider(vendor, self.for_vendor(vendor)))
            .collect()
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let roots = RootOverrides {
        cursor: cli.cursor_root,
        claude: cli.claude_root,
        copilot: cli.copilot_root,
    };

    match cli.command {
        Commands::List { agent } => handlers::list::handle(&roots.providers(agent)),
        Commands::Export {
            id,
            all,
            agent,
            out,
            verbose,
        } => {
            let providers = roots.providers(agent);
            if let Some(id) = id {
                handlers::export::by_id(&providers, &id, out.as_deref())
            } else if all {
                handlers::export::all(&providers, agent, out.as_deref(), verbose)
            } else {
                anyhow::bail!("specify --id <ID> or --all")
            }
        }
        Commands::Agents => handlers::agents::handle(&roots),
    }
}
