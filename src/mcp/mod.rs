//! MCP server integration module.
//!
//! This module provides the integration between the MCP protocol and
//! the Redshift tool handlers using the rmcp framework.

pub mod service;

pub use service::{RedshiftService, SERVER_NAME};
