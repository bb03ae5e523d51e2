//! Static metadata for every tool, grouped by category.

use super::types::ToolMetadata;
use once_cell::sync::Lazy;

mod cloudwatch;
mod knowledge_base;

use cloudwatch::cloudwatch_tools;
use knowledge_base::knowledge_base_tools;

/// All tools with static metadata, cached and sorted alphabetically.
static CACHED_TOOL_METADATA: Lazy<Vec<ToolMetadata>> = Lazy::new(|| {
    let mut tools = Vec::new();
    tools.extend(cloudwatch_tools());
    tools.extend(knowledge_base_tools());

    tools.sort_by(|a, b| a.name.cmp(b.name));
    tools
});

/// Returns a static reference to all tool metadata (cached, sorted).
pub fn all_tool_metadata() -> &'static [ToolMetadata] {
    &CACHED_TOOL_METADATA
}

/// Names of every registered tool, sorted.
pub fn available_tools() -> Vec<&'static str> {
    all_tool_metadata().iter().map(|t| t.name).collect()
}

pub fn find_tool(name: &str) -> Option<&'static ToolMetadata> {
    all_tool_metadata().iter().find(|t| t.name == name)
}
