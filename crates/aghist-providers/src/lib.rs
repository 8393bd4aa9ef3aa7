// Error types
pub mod error;

// Trait-based architecture (public API)
pub mod traits;

// Provider implementations
pub mod claude;
pub mod copilot;
pub mod cursor;

// Tool name mapping and coverage diagnostics
pub mod tool_map;

// Provider registry
pub mod registry;

// Shared JSON helpers
pub(crate) mod util;

// Traits
pub use traits::{ChatProvider, ExtractOutcome};

// Providers
pub use claude::ClaudeProvider;
pub use copilot::CopilotProvider;
pub use cursor::CursorProvider;

// Registry
pub use registry::{ProviderInfo, all_provider_info, create_all_providers, create_provider};

// Tool mapping
pub use tool_map::{NameMapping, ToolCoverage, map_tool_name};

// Error types
pub use error::{Error, Result};
