//! Query execution engine.
//!
//! Runs one statement per call on a freshly opened connection:
//! - Rejects blank input before connecting
//! - Formats row-producing results into ordered row-mappings
//! - Reports row-affecting results as a single `affected_rows` row
//! - Normalizes every failure into one `InvalidOperation` message
//!
//! The connection is released on every exit path.

use crate::db::connector::{Connector, StatementOutcome, open_connection};
use crate::db::diagnostics::error_detail;
use crate::db::format::format_rows;
use crate::error::DbResult;
use crate::models::QueryResult;
use crate::reporter::{ErrorReporter, reject};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Message returned for blank statement text.
pub const EMPTY_QUERY_MESSAGE: &str = "Empty query provided";

/// Longest statement prefix written to logs.
const LOG_SQL_MAX_CHARS: usize = 100;

/// Executes single statements against the configured cluster.
#[derive(Clone)]
pub struct QueryExecutor {
    connector: Arc<dyn Connector>,
}

impl QueryExecutor {
    /// Create a new executor over the given connection factory.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Execute `sql` verbatim and return its full result.
    ///
    /// Every failure is reported once through `reporter` and returned as
    /// `RedshiftError::InvalidOperation`.
    pub async fn execute(&self, sql: &str, reporter: &dyn ErrorReporter) -> DbResult<QueryResult> {
        if sql.trim().is_empty() {
            return Err(reject(reporter, EMPTY_QUERY_MESSAGE).await);
        }

        let start = Instant::now();
        debug!(sql = %truncate_sql(sql), "Executing query");

        let mut guard = match open_connection(self.connector.as_ref()).await {
            Ok(guard) => guard,
            Err(e) => {
                let message = format!("Error during query execution: {}", e);
                return Err(reject(reporter, message).await);
            }
        };

        let outcome = guard.execute(sql).await;
        guard.release().await;

        match outcome {
            Ok(outcome) => {
                let result = into_result(outcome, start.elapsed().as_secs_f64());
                debug!(
                    rows = result.row_count(),
                    row_producing = result.is_row_producing(),
                    elapsed_secs = result.execution_time.unwrap_or_default(),
                    "Query completed"
                );
                Ok(result)
            }
            Err(e) => {
                let message = format!("Query execution failed: {}: {}", e.class(), error_detail(&e));
                Err(reject(reporter, message).await)
            }
        }
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor").finish_non_exhaustive()
    }
}

fn into_result(outcome: StatementOutcome, execution_time: f64) -> QueryResult {
    match outcome.columns {
        Some(columns) => {
            let (column_names, rows) = format_rows(&columns, outcome.rows);
            QueryResult::with_rows(column_names, rows, execution_time)
        }
        None => QueryResult::affected(outcome.rows_affected, execution_time),
    }
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(LOG_SQL_MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}
