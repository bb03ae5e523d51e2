//! CloudWatch tools: Logs Insights queries and metric data for cluster resources

use crate::cloudwatch::{
    GET_CLOUDWATCH_LOGS, GET_CLOUDWATCH_METRICS, GetCloudWatchLogsArgs, GetCloudWatchMetricsArgs,
};
use crate::stdio::metadata::types::{ToolMetadata, build_schema};

pub fn cloudwatch_tools() -> Vec<ToolMetadata> {
    vec![
        ToolMetadata {
            name: GET_CLOUDWATCH_LOGS,
            category: "cloudwatch",
            description: "Get logs from CloudWatch for a specific resource in an EKS cluster. Runs a Logs Insights query against the cluster's log group and waits for it to complete. Requires --allow-sensitive-data-access.",
            schema: build_schema::<GetCloudWatchLogsArgs>(),
        },
        ToolMetadata {
            name: GET_CLOUDWATCH_METRICS,
            category: "cloudwatch",
            description: "Get metrics from CloudWatch for a specific resource in an EKS cluster. Dimensions are derived from the resource type unless custom dimensions are given.",
            schema: build_schema::<GetCloudWatchMetricsArgs>(),
        },
    ]
}
