//! AWS SDK implementations of [`LogsApi`] and [`MetricsApi`].

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat};
use chrono::{DateTime, Utc};

use super::api::{
    LogsApi, METRIC_QUERY_ID, MetricDataRequest, MetricSeries, MetricsApi, ResultField, ResultRow,
    StartQueryRequest,
};
use crate::error::ApiError;
use crate::poll::{PollStatus, QueryHandle, StatusReport};

/// CloudWatch Logs Insights through `aws-sdk-cloudwatchlogs`.
#[derive(Debug, Clone)]
pub struct SdkLogsClient {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl SdkLogsClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(config),
        }
    }
}

#[async_trait]
impl LogsApi for SdkLogsClient {
    async fn start_query(&self, request: &StartQueryRequest) -> Result<QueryHandle, ApiError> {
        let output = self
            .client
            .start_query()
            .log_group_name(&request.log_group)
            .start_time(request.start_time)
            .end_time(request.end_time)
            .query_string(&request.query_string)
            .send()
            .await
            .map_err(|e| {
                ApiError::request(
                    "StartQuery",
                    aws_sdk_cloudwatchlogs::error::DisplayErrorContext(e),
                )
            })?;

        output
            .query_id()
            .map(QueryHandle::new)
            .ok_or(ApiError::MissingField {
                operation: "StartQuery",
                field: "queryId",
            })
    }

    async fn get_query_results(
        &self,
        handle: &QueryHandle,
    ) -> Result<StatusReport<Vec<ResultRow>>, ApiError> {
        let output = self
            .client
            .get_query_results()
            .query_id(handle.as_str())
            .send()
            .await
            .map_err(|e| {
                ApiError::request(
                    "GetQueryResults",
                    aws_sdk_cloudwatchlogs::error::DisplayErrorContext(e),
                )
            })?;

        let status = output
            .status()
            .map(|s| PollStatus::parse(s.as_str()))
            .unwrap_or_else(|| PollStatus::Other(String::new()));

        let rows = output
            .results()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        ResultField::new(
                            cell.field().unwrap_or_default(),
                            cell.value().unwrap_or_default(),
                        )
                    })
                    .collect()
            })
            .collect();

        Ok(StatusReport {
            status,
            payload: rows,
        })
    }
}

/// CloudWatch metrics through `aws-sdk-cloudwatch`.
#[derive(Debug, Clone)]
pub struct SdkMetricsClient {
    client: aws_sdk_cloudwatch::Client,
}

impl SdkMetricsClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatch::Client::new(config),
        }
    }
}

#[async_trait]
impl MetricsApi for SdkMetricsClient {
    async fn get_metric_data(&self, request: &MetricDataRequest) -> Result<MetricSeries, ApiError> {
        let dimensions = request
            .dimensions
            .iter()
            .map(|(name, value)| Dimension::builder().name(name).value(value).build())
            .collect::<Vec<Dimension>>();

        let metric = Metric::builder()
            .namespace(&request.namespace)
            .metric_name(&request.metric_name)
            .set_dimensions(Some(dimensions))
            .build();

        let stat = MetricStat::builder()
            .metric(metric)
            .period(request.period)
            .stat(&request.stat)
            .build();

        let query = MetricDataQuery::builder()
            .id(METRIC_QUERY_ID)
            .metric_stat(stat)
            .return_data(true)
            .build();

        let output = self
            .client
            .get_metric_data()
            .metric_data_queries(query)
            .start_time(to_aws_time(&request.start))
            .end_time(to_aws_time(&request.end))
            .max_datapoints(request.max_datapoints)
            .send()
            .await
            .map_err(|e| {
                ApiError::request(
                    "GetMetricData",
                    aws_sdk_cloudwatch::error::DisplayErrorContext(e),
                )
            })?;

        let Some(result) = output.metric_data_results().first() else {
            return Ok(MetricSeries::default());
        };

        Ok(series_from_sdk(result.timestamps(), result.values()))
    }
}

/// Keep timestamps and values aligned by position; a timestamp chrono
/// cannot represent drops its value along with it.
fn series_from_sdk(timestamps: &[AwsDateTime], values: &[f64]) -> MetricSeries {
    let (timestamps, values) = timestamps
        .iter()
        .zip(values)
        .filter_map(|(ts, value)| from_aws_time(ts).map(|ts| (ts, *value)))
        .unzip();
    MetricSeries { timestamps, values }
}

/// Shared AWS configuration from the default provider chain, optionally
/// pinned to `region`.
pub async fn load_sdk_config(region: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

fn to_aws_time(ts: &DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_secs(ts.timestamp())
}

fn from_aws_time(ts: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}
