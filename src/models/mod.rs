//! Data models for the Redshift MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::{
    ConnectionConfig, ConnectionStatus, ConnectionTestResult, DEFAULT_REDSHIFT_PORT,
};
pub use query::{AFFECTED_ROWS_COLUMN, QueryResult, Row, SqlValue};
