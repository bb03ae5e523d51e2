mod toolset;
mod types;

pub use toolset::{ToolsetConfig, ToolsetSource, load_toolset, resolve_toolset};
pub use types::{Cli, available_tools, unknown_tools};
