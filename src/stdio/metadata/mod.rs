//! Static tool metadata for the stdio server.
//!
//! Descriptions and input schemas are built from the argument types, so
//! listing tools never touches AWS.

mod category_metadata;
mod types;

pub use category_metadata::{all_tool_metadata, available_tools, find_tool};
pub use types::{ToolMetadata, build_schema};
