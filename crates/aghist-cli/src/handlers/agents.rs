use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use aghist_providers::{all_provider_info, create_provider};

use crate::commands::RootOverrides;

/// Show each supported agent and whether its storage root exists on disk.
pub fn handle(roots: &RootOverrides) -> Result<()> {
    let tty = std::io::stdout().is_terminal();

    println!("Supported agents:");
    for info in all_provider_info() {
        let provider = create_provider(info.vendor, roots.for_vendor(info.vendor));
        let root = provider.storage_root();
        let mark = match (root.exists(), tty) {
            (true, true) => "✓".green().to_string(),
            (true, false) => "✓".to_string(),
            (false, true) => "✗".red().to_string(),
            (false, false) => "✗".to_string(),
        };
        println!(
            "  {:<9} {:<30} {} {}",
            info.vendor.as_str(),
            info.description,
            mark,
            root.display()
        );
    }
    Ok(())
}
