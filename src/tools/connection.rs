//! Connectivity test tool.
//!
//! This module implements the `test_connection` MCP tool. It never fails:
//! problems are returned as an error-status record.

use crate::db::{Connector, error_detail, open_connection};
use crate::models::{ConnectionTestResult, SqlValue};
use crate::reporter::ErrorReporter;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Statement used to probe the server.
pub const VERSION_PROBE_SQL: &str = "SELECT version();";

/// Handler for the test_connection tool.
#[derive(Clone)]
pub struct ConnectionToolHandler {
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for ConnectionToolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionToolHandler").finish_non_exhaustive()
    }
}

impl ConnectionToolHandler {
    /// Create a new connection tool handler.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Handle the test_connection tool call.
    pub async fn test_connection(&self, reporter: &dyn ErrorReporter) -> ConnectionTestResult {
        match self.probe().await {
            Ok(version) => {
                info!(version = %version, "Connection test succeeded");
                ConnectionTestResult::success(version, now_epoch_secs())
            }
            Err(detail) => {
                let message = format!("Connection test failed: {}", detail);
                reporter.error(&message).await;
                ConnectionTestResult::failure(message, now_epoch_secs())
            }
        }
    }

    async fn probe(&self) -> Result<String, String> {
        let mut guard = open_connection(self.connector.as_ref())
            .await
            .map_err(|e| e.to_string())?;

        let outcome = guard.execute(VERSION_PROBE_SQL).await;
        guard.release().await;

        let outcome = outcome.map_err(|e| error_detail(&e))?;
        debug!(rows = outcome.rows.len(), "Version probe returned");

        match outcome.rows.first().and_then(|row| row.first()) {
            Some(SqlValue::Text(version)) => Ok(version.clone()),
            Some(other) if !other.is_null() => Ok(other.to_string()),
            _ => Err("server returned no version".to_string()),
        }
    }
}

fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
