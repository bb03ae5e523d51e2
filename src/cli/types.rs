use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use super::toolset::{load_toolset, resolve_toolset};
use crate::config::ServerConfig;
use crate::knowledge_base::API_ENDPOINT;
use crate::poll::PollSettings;

/// EKS MCP Server - CloudWatch logs, metrics and troubleshooting guidance
/// for Amazon EKS clusters, served over stdio
///
/// Logs go to stderr; set RUST_LOG=debug for more detail.
#[derive(Parser, Debug)]
#[command(name = "eks-mcp-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable write access mode (allow mutating operations)
    #[arg(long, env = "EKS_MCP_ALLOW_WRITE")]
    pub allow_write: bool,

    /// Enable sensitive data access (required for reading CloudWatch logs)
    #[arg(long, env = "EKS_MCP_ALLOW_SENSITIVE_DATA_ACCESS")]
    pub allow_sensitive_data_access: bool,

    /// AWS region for CloudWatch calls
    ///
    /// Defaults to the region from the AWS config chain.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Maximum number of status checks for a CloudWatch Logs query
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = PollSettings::DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub query_max_attempts: u32,

    /// Wait in seconds after the first pending status check
    ///
    /// Grows by 1.5x per check, capped at 5 seconds.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 1.0,
        value_parser = parse_positive_seconds
    )]
    pub query_initial_delay: f64,

    /// Override the troubleshooting knowledge base endpoint
    #[arg(long, value_name = "URL", env = "EKS_MCP_KNOWLEDGE_BASE_ENDPOINT", hide = true)]
    pub knowledge_base_endpoint: Option<String>,

    /// Enable specific tools by name (comma-separated)
    ///
    /// Example: --tools get_cloudwatch_metrics,search_eks_troubleshoot_guide
    ///
    /// If not specified, all tools are enabled.
    #[arg(long, value_delimiter = ',', conflicts_with = "tool")]
    pub tools: Option<Vec<String>>,

    /// Enable specific tool by name (can be specified multiple times)
    ///
    /// Example: --tool get_cloudwatch_logs --tool get_cloudwatch_metrics
    ///
    /// If not specified, all tools are enabled.
    #[arg(long = "tool", conflicts_with = "tools")]
    pub tool: Vec<String>,

    /// Load tool names from a toolset name or JSON file
    ///
    /// JSON format:
    /// ```json
    /// {
    ///   "tools": [
    ///     "get_cloudwatch_logs",
    ///     "get_cloudwatch_metrics"
    ///   ]
    /// }
    /// ```
    ///
    /// Example: --toolset cloudwatch
    #[arg(long, value_name = "NAME|PATH", conflicts_with_all = ["tool", "tools"])]
    pub toolset: Option<String>,

    /// List available tool names and exit
    #[arg(long)]
    pub list_tools: bool,

    /// List bundled toolsets and exit
    #[arg(long)]
    pub list_toolsets: bool,
}

fn parse_positive_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid number of seconds: {e}"))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("must be greater than zero, got {secs}"))
    }
}

impl Cli {
    /// Get the set of enabled tool names
    ///
    /// Returns None if no filter specified (enable all tools)
    /// Returns Some(HashSet) if filter specified (enable only these tools)
    pub async fn enabled_tools(&self) -> anyhow::Result<Option<HashSet<String>>> {
        // Priority 1: --toolset
        if let Some(ref spec) = self.toolset {
            let source = resolve_toolset(spec)?;
            let tools = load_toolset(&source).await?;
            return Ok(Some(tools.into_iter().collect()));
        }

        // Priority 2: --tools (comma-separated)
        if let Some(tools) = &self.tools {
            return Ok(Some(tools.iter().cloned().collect()));
        }

        // Priority 3: --tool (repeated flags)
        if !self.tool.is_empty() {
            return Ok(Some(self.tool.iter().cloned().collect()));
        }

        Ok(None)
    }

    pub fn poll_settings(&self) -> anyhow::Result<PollSettings> {
        let initial_delay = Duration::try_from_secs_f64(self.query_initial_delay)
            .with_context(|| format!("Invalid --query-initial-delay: {}", self.query_initial_delay))?;
        Ok(PollSettings::new(self.query_max_attempts, initial_delay))
    }

    /// Build the configuration handed to every tool handler.
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        Ok(ServerConfig {
            allow_write: self.allow_write,
            allow_sensitive_data_access: self.allow_sensitive_data_access,
            poll: self.poll_settings()?,
            region: self.region.clone(),
            knowledge_base_endpoint: self
                .knowledge_base_endpoint
                .clone()
                .unwrap_or_else(|| API_ENDPOINT.to_string()),
        })
    }
}

/// Get all available tool names
pub fn available_tools() -> Vec<&'static str> {
    crate::stdio::metadata::available_tools()
}

/// Names in `requested` that are not registered tools, sorted.
pub fn unknown_tools(requested: &HashSet<String>) -> Vec<String> {
    let available = available_tools();
    let mut unknown: Vec<String> = requested
        .iter()
        .filter(|tool| !available.contains(&tool.as_str()))
        .cloned()
        .collect();
    unknown.sort();
    unknown
}
