// Integration tests for the CloudWatch logs and metrics tools

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use eks_mcp_server::cloudwatch::{
    GetCloudWatchLogsArgs, GetCloudWatchMetricsArgs, MetricSeries, SENSITIVE_DATA_REFUSAL,
};
use eks_mcp_server::{PollSettings, ServerConfig};
use serde_json::json;

use common::{FakeLogs, FakeMetrics, handler, row, sensitive_config};

fn logs_args(extra: serde_json::Value) -> GetCloudWatchLogsArgs {
    let mut args = json!({
        "resource_type": "pod",
        "resource_name": "web-1",
        "cluster_name": "prod",
        "log_type": "application",
        "start_time": "2025-01-01T00:00:00Z",
        "end_time": "2025-01-01T01:00:00Z",
    });
    if let (Some(base), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(args).expect("valid logs args")
}

fn metrics_args() -> GetCloudWatchMetricsArgs {
    serde_json::from_value(json!({
        "resource_type": "node",
        "resource_name": "ip-10-0-0-1",
        "cluster_name": "prod",
        "metric_name": "node_cpu_utilization",
        "namespace": "ContainerInsights",
        "start_time": "2025-01-01T00:00:00Z",
        "end_time": "2025-01-01T01:00:00Z",
    }))
    .expect("valid metrics args")
}

#[tokio::test]
async fn test_logs_refused_without_sensitive_data_access() {
    let logs = Arc::new(FakeLogs::scripted(vec![("Complete", vec![])]));
    let metrics = Arc::new(FakeMetrics::default());
    let cloudwatch = handler(logs.clone(), metrics, &ServerConfig::default());

    let response = cloudwatch.get_cloudwatch_logs(logs_args(json!({}))).await;

    assert!(response.is_error);
    assert_eq!(response.message, SENSITIVE_DATA_REFUSAL);
    assert_eq!(response.resource_name, "web-1");
    assert!(response.log_entries.is_empty());
    // Refused before any AWS call
    assert!(logs.started().is_empty());
    assert_eq!(logs.status_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_logs_success_after_pending_statuses() {
    let logs = Arc::new(FakeLogs::scripted(vec![
        ("Scheduled", vec![]),
        ("Running", vec![]),
        (
            "Complete",
            vec![
                row(&[
                    ("@timestamp", "2025-01-01 00:30:00.000"),
                    ("@message", r#"{"level":"error","log":"{\"code\":500}"}"#),
                ]),
                row(&[
                    ("@timestamp", "2025-01-01 00:29:00.000"),
                    ("@message", "web-1 started\n"),
                    ("@logStream", "web-1_default"),
                ]),
            ],
        ),
    ]));
    let cloudwatch = handler(
        logs.clone(),
        Arc::new(FakeMetrics::default()),
        &sensitive_config(),
    );

    let started = tokio::time::Instant::now();
    let response = cloudwatch
        .get_cloudwatch_logs(logs_args(json!({ "filter_pattern": "filter @logStream like 'web'" })))
        .await;

    assert!(!response.is_error, "{}", response.message);
    assert_eq!(
        response.message,
        "Successfully retrieved 2 log entries for pod web-1 in cluster prod"
    );
    assert_eq!(response.log_group, "/aws/containerinsights/prod/application");
    assert_eq!(response.start_time, "2025-01-01T00:00:00Z");
    assert_eq!(response.end_time, "2025-01-01T01:00:00Z");
    assert_eq!(logs.status_calls(), 3);
    // 1s after Scheduled, 1.5s after Running
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(2500) && elapsed < Duration::from_millis(2550),
        "{elapsed:?}"
    );

    assert_eq!(
        serde_json::Value::Object(response.log_entries[0].clone()),
        json!({
            "timestamp": "2025-01-01 00:30:00.000",
            "message": { "level": "error", "log": { "code": 500 } },
        })
    );
    assert_eq!(
        serde_json::Value::Object(response.log_entries[1].clone()),
        json!({
            "timestamp": "2025-01-01 00:29:00.000",
            "message": "web-1 started",
            "@logStream": "web-1_default",
        })
    );

    let requests = logs.started();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.log_group, "/aws/containerinsights/prod/application");
    assert_eq!(
        request.start_time,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().timestamp()
    );
    assert_eq!(
        request.end_time,
        Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap().timestamp()
    );
    assert_eq!(
        request.query_string,
        "fields @timestamp, @message\n\
         | filter @message like 'web-1'\n\
         | filter @logStream like 'web'\n\
         | sort @timestamp desc\n\
         | limit 50"
    );
}

#[tokio::test]
async fn test_control_plane_and_custom_log_groups() {
    let logs = Arc::new(FakeLogs::scripted(vec![("Complete", vec![])]));
    let cloudwatch = handler(
        logs.clone(),
        Arc::new(FakeMetrics::default()),
        &sensitive_config(),
    );

    let response = cloudwatch
        .get_cloudwatch_logs(logs_args(json!({ "log_type": "control-plane" })))
        .await;
    assert_eq!(response.log_group, "/aws/eks/prod/cluster");

    let response = cloudwatch
        .get_cloudwatch_logs(logs_args(json!({ "log_type": "/my/custom/group" })))
        .await;
    assert_eq!(response.log_group, "/my/custom/group");
    assert!(!response.is_error);
}

#[tokio::test]
async fn test_failed_query_becomes_error_response() {
    let logs = Arc::new(FakeLogs::scripted(vec![("Running", vec![]), ("Failed", vec![])]));
    let config = ServerConfig {
        poll: PollSettings::new(5, Duration::from_millis(1)),
        ..sensitive_config()
    };
    let cloudwatch = handler(logs.clone(), Arc::new(FakeMetrics::default()), &config);

    let response = cloudwatch.get_cloudwatch_logs(logs_args(json!({}))).await;

    assert!(response.is_error);
    assert_eq!(
        response.message,
        "Failed to get logs for pod web-1: CloudWatch Logs query failed for pod web-1 (query_id: query-1)"
    );
    assert_eq!(logs.status_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_query_timeout_respects_configured_bound() {
    let logs = Arc::new(FakeLogs::scripted(vec![("Running", vec![])]));
    let config = ServerConfig {
        poll: PollSettings::new(4, Duration::from_secs(1)),
        ..sensitive_config()
    };
    let cloudwatch = handler(logs.clone(), Arc::new(FakeMetrics::default()), &config);

    let response = cloudwatch.get_cloudwatch_logs(logs_args(json!({}))).await;

    assert!(response.is_error);
    assert!(
        response.message.contains("timed out after 4 attempts"),
        "{}",
        response.message
    );
    assert_eq!(logs.status_calls(), 4);
}

#[tokio::test]
async fn test_provider_errors_pass_through() {
    let logs = Arc::new(FakeLogs::erroring("throttled"));
    let cloudwatch = handler(
        logs.clone(),
        Arc::new(FakeMetrics::default()),
        &sensitive_config(),
    );

    let response = cloudwatch.get_cloudwatch_logs(logs_args(json!({}))).await;

    assert!(response.is_error);
    assert_eq!(
        response.message,
        "Failed to get logs for pod web-1: GetQueryResults request failed: throttled"
    );
    assert_eq!(logs.status_calls(), 1);

    let logs = Arc::new(FakeLogs::failing_start("AccessDenied"));
    let cloudwatch = handler(logs.clone(), Arc::new(FakeMetrics::default()), &sensitive_config());
    let response = cloudwatch.get_cloudwatch_logs(logs_args(json!({}))).await;
    assert!(response.is_error);
    assert!(response.message.contains("StartQuery request failed: AccessDenied"));
    assert_eq!(logs.status_calls(), 0);
}

#[tokio::test]
async fn test_invalid_time_range_is_reported() {
    let logs = Arc::new(FakeLogs::scripted(vec![("Complete", vec![])]));
    let cloudwatch = handler(
        logs.clone(),
        Arc::new(FakeMetrics::default()),
        &sensitive_config(),
    );

    let response = cloudwatch
        .get_cloudwatch_logs(logs_args(json!({ "start_time": "yesterday" })))
        .await;
    assert!(response.is_error);
    assert!(response.message.contains("invalid ISO-8601 timestamp 'yesterday'"));

    let response = cloudwatch
        .get_cloudwatch_logs(logs_args(json!({
            "start_time": "2025-01-02T00:00:00Z",
            "end_time": "2025-01-01T00:00:00Z",
        })))
        .await;
    assert!(response.is_error);
    assert!(response.message.contains("is after end time"));
    assert!(logs.started().is_empty());
}

#[tokio::test]
async fn test_metrics_pair_timestamps_with_values() {
    let series = MetricSeries {
        timestamps: vec![
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 1, 0).unwrap(),
        ],
        values: vec![12.5, 30.0],
    };
    let metrics = Arc::new(FakeMetrics::returning(series));
    // Metrics are not gated on sensitive data access
    let cloudwatch = handler(
        Arc::new(FakeLogs::default()),
        metrics.clone(),
        &ServerConfig::default(),
    );

    let response = cloudwatch.get_cloudwatch_metrics(metrics_args()).await;

    assert!(!response.is_error, "{}", response.message);
    assert_eq!(
        response.message,
        "Successfully retrieved 2 metric data points for node ip-10-0-0-1 in cluster prod"
    );
    assert_eq!(response.data_points.len(), 2);
    assert_eq!(response.data_points[0].timestamp, "2025-01-01T00:00:00Z");
    assert_eq!(response.data_points[1].value, 30.0);

    let requests = metrics.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.namespace, "ContainerInsights");
    assert_eq!(request.metric_name, "node_cpu_utilization");
    assert_eq!(request.period, 60);
    assert_eq!(request.stat, "Average");
    assert_eq!(request.max_datapoints, 50);
    assert_eq!(
        request.dimensions,
        vec![
            ("ClusterName".to_string(), "prod".to_string()),
            ("Namespace".to_string(), "default".to_string()),
            ("NodeName".to_string(), "ip-10-0-0-1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_metrics_error_becomes_error_response() {
    let metrics = Arc::new(FakeMetrics {
        error: Some("InvalidParameterCombination".to_string()),
        ..FakeMetrics::default()
    });
    let cloudwatch = handler(
        Arc::new(FakeLogs::default()),
        metrics,
        &ServerConfig::default(),
    );

    let response = cloudwatch.get_cloudwatch_metrics(metrics_args()).await;

    assert!(response.is_error);
    assert_eq!(
        response.message,
        "Failed to get metrics for node ip-10-0-0-1: GetMetricData request failed: InvalidParameterCombination"
    );
    assert!(response.data_points.is_empty());
}
