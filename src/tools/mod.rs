//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `query`: Run arbitrary statements and EXPLAIN plans
//! - `schema`: List schemas and the tables in a schema
//! - `connection`: Probe connectivity and report the server version

pub mod connection;
pub mod query;
pub mod schema;

pub use connection::{ConnectionToolHandler, VERSION_PROBE_SQL};
pub use query::{ExplainQueryInput, QueryToolHandler, RowsOutput, RunQueryInput};
pub use schema::{ListTablesInSchemaInput, SchemaToolHandler, list_tables_sql, quote_literal};
