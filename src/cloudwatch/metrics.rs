//! The `get_cloudwatch_metrics` tool.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::api::{MetricDataRequest, MetricSeries};
use super::handler::CloudWatchHandler;
use super::time_range::{DEFAULT_LOOKBACK_MINUTES, format_timestamp, resolve_time_range};
use crate::error::{ApiError, ToolError};
use crate::response::ToolResponse;

pub const GET_CLOUDWATCH_METRICS: &str = "get_cloudwatch_metrics";

pub const DEFAULT_METRIC_LIMIT: u32 = 50;
pub const DEFAULT_PERIOD_SECONDS: u32 = 60;
pub const DEFAULT_STAT: &str = "Average";
pub const DEFAULT_K8S_NAMESPACE: &str = "default";

fn default_minutes() -> u32 {
    DEFAULT_LOOKBACK_MINUTES
}

fn default_limit() -> u32 {
    DEFAULT_METRIC_LIMIT
}

fn default_period() -> u32 {
    DEFAULT_PERIOD_SECONDS
}

fn default_stat() -> String {
    DEFAULT_STAT.to_string()
}

fn default_k8s_namespace() -> String {
    DEFAULT_K8S_NAMESPACE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetCloudWatchMetricsArgs {
    /// Resource type (pod, node, container, service, cluster)
    pub resource_type: String,

    /// Resource name
    pub resource_name: String,

    /// Name of the EKS cluster
    pub cluster_name: String,

    /// Metric name (e.g., cpu_usage_total, memory_rss)
    pub metric_name: String,

    /// CloudWatch namespace (e.g., "ContainerInsights", "AWS/EC2", "AWS/EKS")
    pub namespace: String,

    /// Kubernetes namespace for the resource
    #[serde(default = "default_k8s_namespace")]
    pub k8s_namespace: String,

    /// Number of minutes to look back
    #[serde(default = "default_minutes")]
    pub minutes: u32,

    /// Start time in ISO format (overrides minutes)
    #[serde(default)]
    pub start_time: Option<String>,

    /// End time in ISO format (defaults to now)
    #[serde(default)]
    pub end_time: Option<String>,

    /// Maximum number of data points to return
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Period in seconds for the metric data points
    #[serde(default = "default_period")]
    pub period: u32,

    /// Statistic to use (Average, Sum, Maximum, Minimum, SampleCount)
    #[serde(default = "default_stat")]
    pub stat: String,

    /// Dimensions to use instead of the ones derived from the resource
    #[serde(default)]
    pub custom_dimensions: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudWatchMetricsResponse {
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "content")]
    pub message: String,
    pub resource_type: String,
    pub resource_name: String,
    pub cluster_name: String,
    pub metric_name: String,
    pub namespace: String,
    pub start_time: String,
    pub end_time: String,
    pub data_points: Vec<DataPoint>,
}

impl CloudWatchMetricsResponse {
    fn failure(args: &GetCloudWatchMetricsArgs, message: String) -> Self {
        Self {
            is_error: true,
            message,
            resource_type: args.resource_type.clone(),
            resource_name: args.resource_name.clone(),
            cluster_name: args.cluster_name.clone(),
            metric_name: args.metric_name.clone(),
            namespace: args.namespace.clone(),
            start_time: String::new(),
            end_time: String::new(),
            data_points: Vec::new(),
        }
    }
}

impl ToolResponse for CloudWatchMetricsResponse {
    fn is_error(&self) -> bool {
        self.is_error
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Dimension key identifying a resource of the given type, if any.
pub fn resource_dimension_key(resource_type: &str) -> Option<&'static str> {
    match resource_type {
        "pod" => Some("PodName"),
        "node" => Some("NodeName"),
        "container" => Some("ContainerName"),
        "service" => Some("Service"),
        _ => None,
    }
}

/// Dimensions for the metric query: the caller's own if given, otherwise
/// cluster, namespace and the resource-specific key.
pub fn metric_dimensions(args: &GetCloudWatchMetricsArgs) -> Vec<(String, String)> {
    if let Some(custom) = &args.custom_dimensions {
        return custom
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    let mut dimensions = vec![
        ("ClusterName".to_string(), args.cluster_name.clone()),
        ("Namespace".to_string(), args.k8s_namespace.clone()),
    ];
    if let Some(key) = resource_dimension_key(&args.resource_type) {
        dimensions.push((key.to_string(), args.resource_name.clone()));
    }
    dimensions
}

/// Pair timestamps with values; surplus entries on either side are dropped.
pub fn pair_data_points(series: &MetricSeries) -> Vec<DataPoint> {
    series
        .timestamps
        .iter()
        .zip(&series.values)
        .map(|(ts, value)| DataPoint {
            timestamp: format_timestamp(ts),
            value: *value,
        })
        .collect()
}

impl CloudWatchHandler {
    /// Fetch data points for one metric of a cluster resource.
    pub async fn get_cloudwatch_metrics(
        &self,
        args: GetCloudWatchMetricsArgs,
    ) -> CloudWatchMetricsResponse {
        let request_id = Uuid::new_v4();

        match self.query_metrics(&args, request_id).await {
            Ok(response) => response,
            Err(e) => {
                let message = format!(
                    "Failed to get metrics for {} {}: {e}",
                    args.resource_type, args.resource_name
                );
                log::error!("[{request_id}] {message}");
                CloudWatchMetricsResponse::failure(&args, message)
            }
        }
    }

    async fn query_metrics(
        &self,
        args: &GetCloudWatchMetricsArgs,
        request_id: Uuid,
    ) -> Result<CloudWatchMetricsResponse, ToolError> {
        let range = resolve_time_range(
            args.start_time.as_deref(),
            args.end_time.as_deref(),
            args.minutes,
        )?;

        log::info!(
            "[{request_id}] Getting CloudWatch metrics for {} {} in cluster {} (metric: {}, namespace: {}, start: {}, end: {})",
            args.resource_type,
            args.resource_name,
            args.cluster_name,
            args.metric_name,
            args.namespace,
            range.start_iso(),
            range.end_iso(),
        );

        let request = MetricDataRequest {
            namespace: args.namespace.clone(),
            metric_name: args.metric_name.clone(),
            dimensions: metric_dimensions(args),
            period: i32::try_from(args.period)
                .map_err(|_| ApiError::invalid("GetMetricData", "period is too large"))?,
            stat: args.stat.clone(),
            start: range.start,
            end: range.end,
            max_datapoints: i32::try_from(args.limit)
                .map_err(|_| ApiError::invalid("GetMetricData", "limit is too large"))?,
        };
        log::debug!("[{request_id}] Metric data request: {request:?}");

        let series = self.metrics.get_metric_data(&request).await?;
        let data_points = pair_data_points(&series);

        log::info!(
            "[{request_id}] Retrieved {} metric data points for {} {}",
            data_points.len(),
            args.resource_type,
            args.resource_name
        );

        Ok(CloudWatchMetricsResponse {
            is_error: false,
            message: format!(
                "Successfully retrieved {} metric data points for {} {} in cluster {}",
                data_points.len(),
                args.resource_type,
                args.resource_name,
                args.cluster_name
            ),
            resource_type: args.resource_type.clone(),
            resource_name: args.resource_name.clone(),
            cluster_name: args.cluster_name.clone(),
            metric_name: args.metric_name.clone(),
            namespace: args.namespace.clone(),
            start_time: range.start_iso(),
            end_time: range.end_iso(),
            data_points,
        })
    }
}
