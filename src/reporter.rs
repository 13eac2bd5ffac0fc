//! Per-request error reporting.
//!
//! Tool failures are announced on a side channel before the error itself is
//! returned. In production that channel is the MCP client's log stream.

use crate::error::RedshiftError;
use async_trait::async_trait;
use rmcp::model::{LoggingLevel, LoggingMessageNotificationParam};
use rmcp::service::{Peer, RoleServer};
use tracing::{error, warn};

/// Logger name attached to client notifications.
pub const REPORTER_LOGGER: &str = "redshift-mcp-server";

/// Receives error messages meant for the caller.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn error(&self, message: &str);
}

/// Forwards errors to the MCP client as `notifications/message`.
#[async_trait]
impl ErrorReporter for Peer<RoleServer> {
    async fn error(&self, message: &str) {
        let param = LoggingMessageNotificationParam {
            level: LoggingLevel::Error,
            logger: Some(REPORTER_LOGGER.to_string()),
            data: serde_json::Value::String(message.to_string()),
        };

        if let Err(e) = self.notify_logging_message(param).await {
            warn!(error = %e, "Failed to send error notification to client");
        }
    }
}

/// Reporter for code paths without a client, such as the startup probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

#[async_trait]
impl ErrorReporter for TracingReporter {
    async fn error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Log a tool failure, report it once and turn it into the error returned to
/// the caller.
pub async fn reject(reporter: &dyn ErrorReporter, message: impl Into<String>) -> RedshiftError {
    let message = message.into();
    error!("{}", message);
    reporter.error(&message).await;
    RedshiftError::invalid_operation(message)
}
