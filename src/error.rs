//! Error types for the Redshift MCP Server.
//!
//! Runtime failures reach tool callers as a single `InvalidOperation` kind whose
//! message embeds the most specific diagnostic the database produced. Driver
//! errors never cross the query executor boundary; see `db::diagnostics`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedshiftError {
    /// The connection factory could not reach or authenticate against the server.
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// Any runtime failure of a tool: blank input, connection or statement failure.
    #[error("{message}")]
    InvalidOperation { message: String },

    /// Fatal startup error: missing settings or a failed connectivity probe.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The MCP transport could not start or stopped with an error.
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl RedshiftError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Check if this is the error kind surfaced by tools.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, RedshiftError>;

/// Convert RedshiftError to MCP ErrorData.
impl From<RedshiftError> for rmcp::ErrorData {
    fn from(err: RedshiftError) -> Self {
        match &err {
            RedshiftError::InvalidOperation { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            RedshiftError::Connection { .. } => rmcp::ErrorData::internal_error(
                err.to_string(),
                Some(serde_json::json!({
                    "suggestion": "Check that the Redshift cluster is reachable and the credentials are valid"
                })),
            ),
            RedshiftError::Configuration { .. } | RedshiftError::Transport { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), None)
            }
        }
    }
}
