use aghist_types::Vendor;
use std::path::PathBuf;

use crate::claude::ClaudeProvider;
use crate::copilot::CopilotProvider;
use crate::cursor::CursorProvider;
use crate::traits::ChatProvider;

/// Static description of a supported agent
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub vendor: Vendor,
    pub description: &'static str,
}

const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        vendor: Vendor::Cursor,
        description: "Cursor IDE",
    },
    ProviderInfo {
        vendor: Vendor::Claude,
        description: "Claude Code CLI",
    },
    ProviderInfo {
        vendor: Vendor::Copilot,
        description: "GitHub Copilot Chat (VS Code)",
    },
];

pub fn all_provider_info() -> &'static [ProviderInfo] {
    PROVIDERS
}

/// Create a provider for one agent, optionally pointed at a non-default
/// storage root (used by tests and by the CLI root-override flags)
pub fn create_provider(vendor: Vendor, root_override: Option<PathBuf>) -> Box<dyn ChatProvider> {
    match vendor {
        Vendor::Cursor => match root_override {
            Some(root) => Box::new(CursorProvider::with_root(root)),
            None => Box::new(CursorProvider::new()),
        },
        Vendor::Claude => match root_override {
            Some(root) => Box::new(ClaudeProvider::with_root(root)),
            None => Box::new(ClaudeProvider::new()),
        },
        Vendor::Copilot => match root_override {
            Some(root) => Box::new(CopilotProvider::with_root(root)),
            None => Box::new(CopilotProvider::new()),
        },
    }
}

/// Create providers for every supported agent, in registry order
pub fn create_all_providers() -> Vec<Box<dyn ChatProvider>> {
    PROVIDERS
        .iter()
        .map(|info| create_provider(info.vendor, None))
        .collect()
}
