//! Uniform result envelope for tool calls.
//!
//! Every tool answers with a serialisable response carrying an error flag
//! and a human-readable message. Failures are reported in-band instead of
//! as MCP errors, so the agent always gets the same shape back.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value;

pub trait ToolResponse: Serialize {
    fn is_error(&self) -> bool;

    fn message(&self) -> &str;

    /// Message first, then the full response as pretty JSON. The response
    /// is also attached as structured content.
    fn into_call_tool_result(self) -> CallToolResult
    where
        Self: Sized,
    {
        let body = serde_json::to_value(&self).unwrap_or(Value::Null);
        let pretty = serde_json::to_string_pretty(&body).unwrap_or_default();
        let content = vec![Content::text(self.message()), Content::text(pretty)];

        let mut result = if self.is_error() {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        };
        result.structured_content = Some(body);
        result
    }
}

/// Wrap a plain-text tool answer.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}
