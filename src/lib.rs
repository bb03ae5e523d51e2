//! MCP server for Amazon EKS: CloudWatch logs and metrics for cluster
//! resources, plus the EKS troubleshooting knowledge base.
//!
//! Logs Insights queries are asynchronous; [`poll::AsyncQueryPoller`]
//! waits for them with a bounded, capped exponential backoff.

pub mod cli;
pub mod cloudwatch;
pub mod config;
pub mod embedded;
pub mod error;
pub mod knowledge_base;
pub mod poll;
pub mod response;
pub mod stdio;

pub use config::ServerConfig;
pub use error::{ApiError, ToolError};
pub use poll::{AsyncQueryPoller, PollError, PollSettings, PollStatus, QueryHandle};
