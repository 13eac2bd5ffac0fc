//! Redshift MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to query Amazon Redshift over its PostgreSQL-compatible wire protocol.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod reporter;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::RedshiftError;
pub use mcp::RedshiftService;
