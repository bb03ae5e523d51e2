//! The `get_cloudwatch_logs` tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::api::StartQueryRequest;
use super::entry::{LogEntry, build_log_entry};
use super::handler::CloudWatchHandler;
use super::query::{build_logs_query, resolve_log_group};
use super::time_range::{DEFAULT_LOOKBACK_MINUTES, resolve_time_range};
use crate::error::ToolError;
use crate::response::ToolResponse;

pub const GET_CLOUDWATCH_LOGS: &str = "get_cloudwatch_logs";

pub const SENSITIVE_DATA_REFUSAL: &str =
    "Access to CloudWatch logs requires --allow-sensitive-data-access flag";

pub const DEFAULT_LOG_LIMIT: u32 = 50;

fn default_minutes() -> u32 {
    DEFAULT_LOOKBACK_MINUTES
}

fn default_limit() -> u32 {
    DEFAULT_LOG_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetCloudWatchLogsArgs {
    /// Resource type (pod, node, container)
    pub resource_type: String,

    /// Resource name to search for in log messages
    pub resource_name: String,

    /// Name of the EKS cluster
    pub cluster_name: String,

    /// Log type ("application", "host", "performance", "dataplane",
    /// "control-plane", or a custom log group name)
    pub log_type: String,

    /// Number of minutes to look back
    #[serde(default = "default_minutes")]
    pub minutes: u32,

    /// Start time in ISO format (overrides minutes)
    #[serde(default)]
    pub start_time: Option<String>,

    /// End time in ISO format (defaults to now)
    #[serde(default)]
    pub end_time: Option<String>,

    /// Maximum number of log entries to return
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Additional CloudWatch Logs Insights filter to apply
    #[serde(default)]
    pub filter_pattern: Option<String>,

    /// Fields to include in the results (defaults to "@timestamp, @message")
    #[serde(default)]
    pub fields: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudWatchLogsResponse {
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "content")]
    pub message: String,
    pub resource_type: String,
    pub resource_name: String,
    pub cluster_name: String,
    pub log_type: String,
    pub log_group: String,
    pub start_time: String,
    pub end_time: String,
    pub log_entries: Vec<LogEntry>,
}

impl CloudWatchLogsResponse {
    fn failure(args: &GetCloudWatchLogsArgs, message: String) -> Self {
        Self {
            is_error: true,
            message,
            resource_type: args.resource_type.clone(),
            resource_name: args.resource_name.clone(),
            cluster_name: args.cluster_name.clone(),
            log_type: args.log_type.clone(),
            log_group: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            log_entries: Vec::new(),
        }
    }
}

impl ToolResponse for CloudWatchLogsResponse {
    fn is_error(&self) -> bool {
        self.is_error
    }

    fn message(&self) -> &str {
        &self.message
    }
}

impl CloudWatchHandler {
    /// Run a Logs Insights query for messages mentioning a resource and
    /// wait for it to finish.
    pub async fn get_cloudwatch_logs(&self, args: GetCloudWatchLogsArgs) -> CloudWatchLogsResponse {
        let request_id = Uuid::new_v4();

        if !self.allow_sensitive_data_access {
            log::error!("[{request_id}] {SENSITIVE_DATA_REFUSAL}");
            return CloudWatchLogsResponse::failure(&args, SENSITIVE_DATA_REFUSAL.to_string());
        }

        match self.query_logs(&args, request_id).await {
            Ok(response) => response,
            Err(e) => {
                let message = format!(
                    "Failed to get logs for {} {}: {e}",
                    args.resource_type, args.resource_name
                );
                log::error!("[{request_id}] {message}");
                CloudWatchLogsResponse::failure(&args, message)
            }
        }
    }

    async fn query_logs(
        &self,
        args: &GetCloudWatchLogsArgs,
        request_id: Uuid,
    ) -> Result<CloudWatchLogsResponse, ToolError> {
        let range = resolve_time_range(
            args.start_time.as_deref(),
            args.end_time.as_deref(),
            args.minutes,
        )?;
        let log_group = resolve_log_group(&args.cluster_name, &args.log_type);
        let query_string = build_logs_query(
            args.fields.as_deref(),
            &args.resource_name,
            args.filter_pattern.as_deref(),
            args.limit,
        );

        log::info!(
            "[{request_id}] Starting CloudWatch Logs query for {} {} in cluster {} (log_group: {log_group}, start: {}, end: {})",
            args.resource_type,
            args.resource_name,
            args.cluster_name,
            range.start_iso(),
            range.end_iso(),
        );

        let handle = self
            .logs
            .start_query(&StartQueryRequest {
                log_group: log_group.clone(),
                start_time: range.start.timestamp(),
                end_time: range.end.timestamp(),
                query_string,
            })
            .await?;

        let subject = format!("{} {}", args.resource_type, args.resource_name);
        let rows = self
            .poller
            .poll_until_complete(self.logs.as_ref(), &handle, &subject)
            .await?;

        let log_entries: Vec<LogEntry> = rows.iter().map(|row| build_log_entry(row)).collect();

        log::info!(
            "[{request_id}] Retrieved {} log entries for {subject}",
            log_entries.len()
        );

        Ok(CloudWatchLogsResponse {
            is_error: false,
            message: format!(
                "Successfully retrieved {} log entries for {subject} in cluster {}",
                log_entries.len(),
                args.cluster_name
            ),
            resource_type: args.resource_type.clone(),
            resource_name: args.resource_name.clone(),
            cluster_name: args.cluster_name.clone(),
            log_type: args.log_type.clone(),
            log_group,
            start_time: range.start_iso(),
            end_time: range.end_iso(),
            log_entries,
        })
    }
}
