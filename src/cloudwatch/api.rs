//! Seams between the tool handlers and the CloudWatch services.
//!
//! The handlers only ever see these traits; [`super::aws`] implements them
//! on top of the AWS SDK and tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::poll::{QueryHandle, QueryStatusProvider, StatusReport};

/// One `field`/`value` cell of a Logs Insights result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub field: String,
    pub value: String,
}

impl ResultField {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type ResultRow = Vec<ResultField>;

/// Parameters of a Logs Insights `StartQuery` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartQueryRequest {
    pub log_group: String,
    /// Epoch seconds
    pub start_time: i64,
    /// Epoch seconds
    pub end_time: i64,
    pub query_string: String,
}

#[async_trait]
pub trait LogsApi: Send + Sync {
    async fn start_query(&self, request: &StartQueryRequest) -> Result<QueryHandle, ApiError>;

    async fn get_query_results(
        &self,
        handle: &QueryHandle,
    ) -> Result<StatusReport<Vec<ResultRow>>, ApiError>;
}

#[async_trait]
impl<L: LogsApi + ?Sized> QueryStatusProvider for L {
    type Payload = Vec<ResultRow>;

    async fn query_status(
        &self,
        handle: &QueryHandle,
    ) -> Result<StatusReport<Vec<ResultRow>>, ApiError> {
        self.get_query_results(handle).await
    }
}

/// Id of the single metric data query issued per request.
pub const METRIC_QUERY_ID: &str = "m1";

/// A single-statistic `GetMetricData` request.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDataRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, String)>,
    /// Seconds
    pub period: i32,
    pub stat: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_datapoints: i32,
}

/// Timestamps and values of the first metric data result, as returned.
/// The two lists are not guaranteed to have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn get_metric_data(&self, request: &MetricDataRequest) -> Result<MetricSeries, ApiError>;
}
