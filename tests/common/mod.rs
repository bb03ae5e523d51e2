// Shared in-memory fakes for the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use eks_mcp_server::cloudwatch::{
    CloudWatchHandler, LogsApi, MetricDataRequest, MetricSeries, MetricsApi, ResultField,
    ResultRow, StartQueryRequest,
};
use eks_mcp_server::knowledge_base::RequestSigner;
use eks_mcp_server::{ApiError, PollStatus, QueryHandle, ServerConfig};
use eks_mcp_server::poll::StatusReport;

/// Logs Insights fake: hands out one query id and answers status checks
/// from a script, repeating the last answer once the script runs out.
#[derive(Default)]
pub struct FakeLogs {
    pub started: Mutex<Vec<StartQueryRequest>>,
    pub status_calls: Mutex<usize>,
    script: Mutex<VecDeque<Result<StatusReport<Vec<ResultRow>>, String>>>,
    last: Mutex<Option<Result<StatusReport<Vec<ResultRow>>, String>>>,
    pub fail_start: Option<String>,
}

impl FakeLogs {
    pub fn scripted(statuses: Vec<(&str, Vec<ResultRow>)>) -> Self {
        let script = statuses
            .into_iter()
            .map(|(status, payload)| {
                Ok(StatusReport {
                    status: PollStatus::parse(status),
                    payload,
                })
            })
            .collect();
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    pub fn erroring(message: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(message.to_string())])),
            ..Self::default()
        }
    }

    pub fn failing_start(message: &str) -> Self {
        Self {
            fail_start: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }

    pub fn started(&self) -> Vec<StartQueryRequest> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogsApi for FakeLogs {
    async fn start_query(&self, request: &StartQueryRequest) -> Result<QueryHandle, ApiError> {
        if let Some(message) = &self.fail_start {
            return Err(ApiError::request("StartQuery", message));
        }
        self.started.lock().unwrap().push(request.clone());
        Ok(QueryHandle::new("query-1"))
    }

    async fn get_query_results(
        &self,
        _handle: &QueryHandle,
    ) -> Result<StatusReport<Vec<ResultRow>>, ApiError> {
        *self.status_calls.lock().unwrap() += 1;

        let next = self.script.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = Some(answer.clone());
                answer
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no scripted status".to_string())),
        };
        answer.map_err(|message| ApiError::request("GetQueryResults", message))
    }
}

/// Metrics fake returning a fixed series and recording requests.
#[derive(Default)]
pub struct FakeMetrics {
    pub series: MetricSeries,
    pub error: Option<String>,
    pub requests: Mutex<Vec<MetricDataRequest>>,
}

impl FakeMetrics {
    pub fn returning(series: MetricSeries) -> Self {
        Self {
            series,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<MetricDataRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsApi for FakeMetrics {
    async fn get_metric_data(&self, request: &MetricDataRequest) -> Result<MetricSeries, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.error {
            Some(message) => Err(ApiError::request("GetMetricData", message)),
            None => Ok(self.series.clone()),
        }
    }
}

/// Leaves requests untouched.
pub struct NoopSigner;

#[async_trait]
impl RequestSigner for NoopSigner {
    async fn sign(&self, _request: &mut reqwest::Request) -> Result<(), ApiError> {
        Ok(())
    }
}

pub fn row(cells: &[(&str, &str)]) -> ResultRow {
    cells.iter().map(|(f, v)| ResultField::new(*f, *v)).collect()
}

pub fn sensitive_config() -> ServerConfig {
    ServerConfig {
        allow_sensitive_data_access: true,
        ..ServerConfig::default()
    }
}

pub fn handler(
    logs: Arc<FakeLogs>,
    metrics: Arc<FakeMetrics>,
    config: &ServerConfig,
) -> CloudWatchHandler {
    CloudWatchHandler::new(logs, metrics, config)
}
