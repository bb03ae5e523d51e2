//! Runtime configuration shared by every tool handler.

use crate::knowledge_base::API_ENDPOINT;
use crate::poll::PollSettings;

/// Server-wide settings, built once at startup from the command line and
/// handed to each handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Mutating tools are allowed
    pub allow_write: bool,
    /// Tools that can expose logs or other sensitive data are allowed
    pub allow_sensitive_data_access: bool,
    /// Bound and backoff for Logs Insights queries
    pub poll: PollSettings,
    /// AWS region override; `None` uses the default provider chain
    pub region: Option<String>,
    pub knowledge_base_endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allow_write: false,
            allow_sensitive_data_access: false,
            poll: PollSettings::default(),
            region: None,
            knowledge_base_endpoint: API_ENDPOINT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Suffix for the startup log line, e.g.
    /// `" in read-only mode, restricted sensitive data access mode"`.
    /// Empty when everything is allowed.
    pub fn mode_description(&self) -> String {
        let mut modes = Vec::new();
        if !self.allow_write {
            modes.push("read-only mode");
        }
        if !self.allow_sensitive_data_access {
            modes.push("restricted sensitive data access mode");
        }

        if modes.is_empty() {
            String::new()
        } else {
            format!(" in {}", modes.join(", "))
        }
    }
}
