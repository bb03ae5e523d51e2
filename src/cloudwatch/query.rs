//! Log group naming and Logs Insights query construction.

/// Container Insights log types that live under
/// `/aws/containerinsights/<cluster>/<type>`.
pub const CONTAINER_INSIGHTS_LOG_TYPES: &[&str] = &["application", "host", "performance", "dataplane"];

pub const CONTROL_PLANE_LOG_TYPE: &str = "control-plane";

pub const DEFAULT_QUERY_FIELDS: &str = "@timestamp, @message";

/// Map a log type keyword to the log group that holds it.
///
/// Unknown keywords are taken to be a full log group name.
pub fn resolve_log_group(cluster_name: &str, log_type: &str) -> String {
    if CONTAINER_INSIGHTS_LOG_TYPES.contains(&log_type) {
        format!("/aws/containerinsights/{cluster_name}/{log_type}")
    } else if log_type == CONTROL_PLANE_LOG_TYPE {
        format!("/aws/eks/{cluster_name}/cluster")
    } else {
        log_type.to_string()
    }
}

/// Build the Logs Insights query for messages mentioning `resource_name`,
/// newest first.
pub fn build_logs_query(
    fields: Option<&str>,
    resource_name: &str,
    filter_pattern: Option<&str>,
    limit: u32,
) -> String {
    let fields = fields
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_QUERY_FIELDS);

    let mut lines = vec![
        format!("fields {fields}"),
        format!("| filter @message like '{}'", escape_literal(resource_name)),
    ];

    if let Some(pattern) = filter_pattern.map(str::trim).filter(|p| !p.is_empty()) {
        lines.push(format!("| {pattern}"));
    }

    lines.push("| sort @timestamp desc".to_string());
    lines.push(format!("| limit {limit}"));
    lines.join("\n")
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_insights_types_map_under_cluster() {
        for log_type in CONTAINER_INSIGHTS_LOG_TYPES {
            assert_eq!(
                resolve_log_group("prod", log_type),
                format!("/aws/containerinsights/prod/{log_type}")
            );
        }
    }

    #[test]
    fn control_plane_maps_to_eks_cluster_group() {
        assert_eq!(resolve_log_group("prod", "control-plane"), "/aws/eks/prod/cluster");
    }

    #[test]
    fn anything_else_is_a_log_group_name() {
        assert_eq!(
            resolve_log_group("prod", "/custom/app/logs"),
            "/custom/app/logs"
        );
    }

    #[test]
    fn builds_default_query() {
        assert_eq!(
            build_logs_query(None, "web-1", None, 50),
            "fields @timestamp, @message\n\
             | filter @message like 'web-1'\n\
             | sort @timestamp desc\n\
             | limit 50"
        );
    }

    #[test]
    fn applies_fields_and_filter_pattern() {
        let query = build_logs_query(
            Some("@timestamp, @message, kubernetes.pod_name"),
            "api",
            Some("filter @logStream like 'api'"),
            10,
        );
        assert_eq!(
            query,
            "fields @timestamp, @message, kubernetes.pod_name\n\
             | filter @message like 'api'\n\
             | filter @logStream like 'api'\n\
             | sort @timestamp desc\n\
             | limit 10"
        );
    }

    #[test]
    fn blank_overrides_fall_back_to_defaults() {
        assert_eq!(
            build_logs_query(Some(" "), "x", Some(""), 5),
            build_logs_query(None, "x", None, 5)
        );
    }

    #[test]
    fn quotes_in_resource_name_are_escaped() {
        let query = build_logs_query(None, "it's", None, 1);
        assert!(query.contains(r"like 'it\'s'"));
    }
}
