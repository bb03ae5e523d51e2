use std::sync::Arc;

use super::api::{LogsApi, MetricsApi};
use crate::config::ServerConfig;
use crate::poll::AsyncQueryPoller;

/// Serves the `get_cloudwatch_logs` and `get_cloudwatch_metrics` tools.
///
/// Log retrieval is gated on `allow_sensitive_data_access`; metrics are
/// always available.
#[derive(Clone)]
pub struct CloudWatchHandler {
    pub(super) logs: Arc<dyn LogsApi>,
    pub(super) metrics: Arc<dyn MetricsApi>,
    pub(super) poller: AsyncQueryPoller,
    pub(super) allow_sensitive_data_access: bool,
}

impl CloudWatchHandler {
    pub fn new(
        logs: Arc<dyn LogsApi>,
        metrics: Arc<dyn MetricsApi>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            logs,
            metrics,
            poller: AsyncQueryPoller::new(config.poll),
            allow_sensitive_data_access: config.allow_sensitive_data_access,
        }
    }
}
