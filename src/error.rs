//! Error types shared by the tool handlers and their AWS collaborators.

use std::fmt::Display;

use thiserror::Error;

use crate::cloudwatch::TimeRangeError;
use crate::poll::PollError;

/// Failure talking to a remote API (CloudWatch Logs, CloudWatch, the
/// knowledge base endpoint).
///
/// These are passed through the poller untouched; the tool layer turns
/// them into error-flagged responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} request failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} response is missing `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },

    #[error("AWS credentials unavailable: {0}")]
    Credentials(String),
}

impl ApiError {
    pub fn request(operation: &'static str, err: impl Display) -> Self {
        Self::Request {
            operation,
            message: err.to_string(),
        }
    }

    pub fn invalid(operation: &'static str, err: impl Display) -> Self {
        Self::InvalidRequest {
            operation,
            message: err.to_string(),
        }
    }
}

/// Anything that can go wrong inside a CloudWatch tool call. Always
/// rendered into the tool's error-flagged response, never returned to the
/// MCP client as a protocol error.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
