use anyhow::{Context, Result};

use aghist_providers::ChatProvider;
use aghist_types::ChatSummary;

/// List every conversation the selected providers can see, newest first.
pub fn handle(providers: &[Box<dyn ChatProvider>]) -> Result<()> {
    let mut chats: Vec<ChatSummary> = Vec::new();
    for provider in providers {
        let summaries = provider
            .list_metadata()
            .with_context(|| format!("listing {} chats", provider.vendor()))?;
        chats.extend(summaries);
    }

    // Stable sort keeps each provider's internal ordering for same-day chats.
    chats.sort_by(|a, b| b.date.cmp(&a.date));

    println!("Found {} chats:", chats.len());
    for chat in &chats {
        println!("  {} - \"{}\" ({})", chat.id, chat.title, chat.date);
    }
    Ok(())
}
