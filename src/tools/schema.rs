//! Schema introspection tools.
//!
//! This module implements the `list_schemas` and `list_tables_in_schema` MCP
//! tools on top of `information_schema`.

use crate::db::QueryExecutor;
use crate::error::DbResult;
use crate::reporter::{ErrorReporter, reject};
use crate::tools::query::RowsOutput;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

/// Statement behind list_schemas.
pub const LIST_SCHEMAS_SQL: &str =
    "SELECT schema_name, schema_owner FROM information_schema.schemata ORDER BY schema_name";

/// Message returned for a blank schema name.
pub const EMPTY_SCHEMA_MESSAGE: &str = "Empty schema name provided";

/// Input for the list_tables_in_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInSchemaInput {
    /// Name of the schema whose tables and views to list (e.g. "public")
    pub schema_name: String,
}

/// Handler for schema introspection tools.
#[derive(Debug, Clone)]
pub struct SchemaToolHandler {
    executor: QueryExecutor,
}

impl SchemaToolHandler {
    /// Create a new schema tool handler.
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Handle the list_schemas tool call.
    pub async fn list_schemas(&self, reporter: &dyn ErrorReporter) -> DbResult<RowsOutput> {
        let result = self.executor.execute(LIST_SCHEMAS_SQL, reporter).await?;
        info!(count = result.row_count(), "Listed schemas");
        Ok(result.into())
    }

    /// Handle the list_tables_in_schema tool call.
    pub async fn list_tables_in_schema(
        &self,
        input: ListTablesInSchemaInput,
        reporter: &dyn ErrorReporter,
    ) -> DbResult<RowsOutput> {
        let schema = input.schema_name;
        if schema.trim().is_empty() {
            return Err(reject(reporter, EMPTY_SCHEMA_MESSAGE).await);
        }

        match self.executor.execute(&list_tables_sql(&schema), reporter).await {
            Ok(result) => {
                info!(schema = %schema, count = result.row_count(), "Listed tables");
                Ok(result.into())
            }
            Err(e) => Err(reject(
                reporter,
                format!("Failed to list tables in schema '{}': {}", schema, e),
            )
            .await),
        }
    }
}

/// Statement behind list_tables_in_schema for the given schema.
pub fn list_tables_sql(schema: &str) -> String {
    format!(
        "SELECT table_name, table_type, table_schema FROM information_schema.tables \
         WHERE table_schema = {} ORDER BY table_name",
        quote_literal(schema)
    )
}

/// Quote a string as a SQL literal.
///
/// Single quotes are doubled. When the value contains backslashes they are
/// doubled too and the literal gets the `E` escape-string prefix, so the
/// value round-trips whatever the server's `standard_conforming_strings`.
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 3);
    if value.contains('\\') {
        quoted.push('E');
    }
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_plain() {
        assert_eq!(quote_literal("public"), "'public'");
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
        assert_eq!(
            quote_literal("x' OR '1'='1"),
            "'x'' OR ''1''=''1'"
        );
    }

    #[test]
    fn test_quote_literal_backslash_uses_escape_string() {
        assert_eq!(quote_literal(r"a\b"), r"E'a\\b'");
        assert_eq!(quote_literal(r"it\'s"), r"E'it\\''s'");
    }

    #[test]
    fn test_list_tables_sql() {
        assert_eq!(
            list_tables_sql("public"),
            "SELECT table_name, table_type, table_schema FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name"
        );
    }

    #[test]
    fn test_list_tables_input_deserialization() {
        let input: ListTablesInSchemaInput =
            serde_json::from_str(r#"{"schema_name": "sales"}"#).unwrap();
        assert_eq!(input.schema_name, "sales");
    }
}
