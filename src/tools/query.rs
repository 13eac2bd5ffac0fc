//! Query execution tools.
//!
//! This module implements the `run_query` and `explain_query` MCP tools.
//! Statements are passed to the cluster verbatim; nothing is parsed or
//! restricted here.

use crate::db::{EMPTY_QUERY_MESSAGE, QueryExecutor};
use crate::error::DbResult;
use crate::models::{QueryResult, Row};
use crate::reporter::{ErrorReporter, reject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Input for the run_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunQueryInput {
    /// SQL statement to execute. Any statement the cluster accepts, including writes and DDL.
    pub query: String,
}

/// Input for the explain_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExplainQueryInput {
    /// SQL statement to explain, without the EXPLAIN keyword
    pub query: String,
}

/// Output shared by every row-returning tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RowsOutput {
    /// Result rows as column-to-value maps, in column order. Row-affecting
    /// statements return a single `{"affected_rows": N}` row.
    pub rows: Vec<Row>,
    /// Number of rows returned
    pub row_count: usize,
}

impl From<QueryResult> for RowsOutput {
    fn from(result: QueryResult) -> Self {
        let rows = result.into_rows();
        Self {
            row_count: rows.len(),
            rows,
        }
    }
}

/// Handler for the query tools.
#[derive(Debug, Clone)]
pub struct QueryToolHandler {
    executor: QueryExecutor,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Handle the run_query tool call.
    pub async fn run_query(
        &self,
        input: RunQueryInput,
        reporter: &dyn ErrorReporter,
    ) -> DbResult<RowsOutput> {
        let result = self.executor.execute(&input.query, reporter).await?;
        info!(rows = result.row_count(), "Query executed");
        Ok(result.into())
    }

    /// Handle the explain_query tool call.
    pub async fn explain_query(
        &self,
        input: ExplainQueryInput,
        reporter: &dyn ErrorReporter,
    ) -> DbResult<RowsOutput> {
        // Checked before prefixing, otherwise "EXPLAIN " alone would reach the server
        if input.query.trim().is_empty() {
            return Err(reject(reporter, EMPTY_QUERY_MESSAGE).await);
        }

        let sql = explain_sql(&input.query);
        let result = self.executor.execute(&sql, reporter).await?;
        Ok(result.into())
    }
}

/// Prefix a statement with `EXPLAIN`.
pub fn explain_sql(query: &str) -> String {
    format!("EXPLAIN {}", query)
}
