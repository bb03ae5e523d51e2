use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, GetPromptRequestParam, GetPromptResult,
        Implementation, JsonObject, ListPromptsResult, ListResourceTemplatesResult,
        ListResourcesResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::stdio,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::metadata::{all_tool_metadata, find_tool};
use crate::cloudwatch::{
    CloudWatchHandler, GET_CLOUDWATCH_LOGS, GET_CLOUDWATCH_METRICS, GetCloudWatchLogsArgs,
    GetCloudWatchMetricsArgs,
};
use crate::config::ServerConfig;
use crate::knowledge_base::{
    KnowledgeBaseHandler, SEARCH_EKS_TROUBLESHOOT_GUIDE, SearchTroubleshootGuideArgs,
};
use crate::response::{ToolResponse, text_result};

pub const SERVER_NAME: &str = "eks-mcp-server";

const SERVER_INSTRUCTIONS: &str = "EKS MCP Server provides tools for monitoring and troubleshooting Amazon EKS clusters. \
You can retrieve and analyze CloudWatch logs and metrics from your EKS clusters, \
and search the EKS troubleshooting guide for step-by-step fixes to common issues.";

const SENSITIVE_DATA_NOTE: &str =
    " Log retrieval requires the server to be started with --allow-sensitive-data-access.";

/// MCP server exposing the EKS tools over stdio.
///
/// Every tool is registered regardless of the access flags; the tools
/// enforce access themselves. `enabled_tools` only narrows what the client
/// can see and call.
#[derive(Clone)]
pub struct EksMcpServer {
    config: ServerConfig,
    cloudwatch: CloudWatchHandler,
    knowledge_base: KnowledgeBaseHandler,
    /// Enabled tool names (filtered by --tool/--tools/--toolset)
    enabled_tools: Option<HashSet<String>>,
}

impl EksMcpServer {
    pub fn new(
        config: ServerConfig,
        cloudwatch: CloudWatchHandler,
        knowledge_base: KnowledgeBaseHandler,
        enabled_tools: Option<HashSet<String>>,
    ) -> Self {
        Self {
            config,
            cloudwatch,
            knowledge_base,
            enabled_tools,
        }
    }

    pub fn is_enabled(&self, tool_name: &str) -> bool {
        self.enabled_tools
            .as_ref()
            .is_none_or(|enabled| enabled.contains(tool_name))
    }

    /// Tool listing served to clients, in name order.
    pub fn tools(&self) -> Vec<Tool> {
        all_tool_metadata()
            .iter()
            .filter(|meta| self.is_enabled(meta.name))
            .map(|meta| {
                let schema_obj = match meta.schema.clone() {
                    Value::Object(obj) => Arc::new(obj),
                    _ => Arc::new(JsonObject::new()),
                };

                Tool {
                    name: meta.name.into(),
                    title: None,
                    description: Some(meta.description.into()),
                    input_schema: schema_obj,
                    output_schema: None,
                    annotations: None,
                    icons: None,
                    meta: None,
                }
            })
            .collect()
    }

    /// Run the named tool with the given arguments.
    ///
    /// Tool failures come back as error-flagged results; only unknown or
    /// disabled tools and malformed arguments are MCP errors.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        if !self.is_enabled(tool_name) {
            return Err(McpError::invalid_params(
                format!("Tool '{tool_name}' is not enabled"),
                None,
            ));
        }

        let meta = find_tool(tool_name).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown tool: {tool_name}"), None)
        })?;

        log::debug!("Calling tool '{}' ({})", meta.name, meta.category);

        match meta.name {
            GET_CLOUDWATCH_LOGS => {
                let args: GetCloudWatchLogsArgs = parse_arguments(tool_name, arguments)?;
                Ok(self
                    .cloudwatch
                    .get_cloudwatch_logs(args)
                    .await
                    .into_call_tool_result())
            }
            GET_CLOUDWATCH_METRICS => {
                let args: GetCloudWatchMetricsArgs = parse_arguments(tool_name, arguments)?;
                Ok(self
                    .cloudwatch
                    .get_cloudwatch_metrics(args)
                    .await
                    .into_call_tool_result())
            }
            SEARCH_EKS_TROUBLESHOOT_GUIDE => {
                let args: SearchTroubleshootGuideArgs = parse_arguments(tool_name, arguments)?;
                let answer = self
                    .knowledge_base
                    .search_eks_troubleshoot_guide(&args.query)
                    .await;
                Ok(text_result(answer))
            }
            other => Err(McpError::internal_error(
                format!("Tool '{other}' has no handler"),
                None,
            )),
        }
    }

    /// Serve over stdio until the client disconnects or `shutdown` fires.
    pub async fn serve_stdio(self, shutdown: CancellationToken) -> Result<()> {
        log::info!("Starting stdio server");

        let service = self.serve(stdio()).await.inspect_err(|e| {
            log::error!("serving error: {e:?}");
        })?;

        tokio::select! {
            res = service.waiting() => {
                res?;
            }
            () = shutdown.cancelled() => {
                log::info!("Shutdown requested, closing stdio transport");
            }
        }

        log::info!("Stdio server stopped");
        Ok(())
    }
}

fn parse_arguments<T: DeserializeOwned>(
    tool_name: &str,
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value).map_err(|e| {
        McpError::invalid_params(format!("Invalid arguments for {tool_name}: {e}"), None)
    })
}

impl ServerHandler for EksMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        let mut instructions = SERVER_INSTRUCTIONS.to_string();
        if !self.config.allow_sensitive_data_access {
            instructions.push_str(SENSITIVE_DATA_NOTE);
        }

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some(instructions),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.tools();
        log::debug!("Serving {} tools from static metadata", tools.len());
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn get_prompt(
        &self,
        _request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        Err(McpError::invalid_request("Prompts are not supported", None))
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            prompts: vec![],
            next_cursor: None,
        })
    }

    /// Resources capability is not advertised; these exist to satisfy the
    /// trait.
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        Err(McpError::invalid_request(
            "Resources are not supported",
            Some(json!({
                "message": "This server only supports tools.",
                "uri": request.uri
            })),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: Vec::new(),
        })
    }
}
