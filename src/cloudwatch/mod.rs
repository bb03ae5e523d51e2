//! CloudWatch logs and metrics tools.

pub mod api;
pub mod aws;
pub mod entry;
mod handler;
pub mod logs;
pub mod metrics;
pub mod query;
pub mod time_range;

pub use api::{
    LogsApi, MetricDataRequest, MetricSeries, MetricsApi, ResultField, ResultRow, StartQueryRequest,
};
pub use aws::{SdkLogsClient, SdkMetricsClient, load_sdk_config};
pub use handler::CloudWatchHandler;
pub use logs::{
    CloudWatchLogsResponse, GET_CLOUDWATCH_LOGS, GetCloudWatchLogsArgs, SENSITIVE_DATA_REFUSAL,
};
pub use metrics::{
    CloudWatchMetricsResponse, DataPoint, GET_CLOUDWATCH_METRICS, GetCloudWatchMetricsArgs,
};
pub use time_range::{TimeRange, TimeRangeError, resolve_time_range};
