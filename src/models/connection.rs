//! Connection-related data models.
//!
//! This module defines the static Redshift connection configuration and the
//! result record of a connectivity test.

use schemars::JsonSchema;
use serde::Serialize;

/// Default Redshift port.
pub const DEFAULT_REDSHIFT_PORT: u16 = 5439;

/// Configuration for connecting to a Redshift database.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: String,
}

impl ConnectionConfig {
    /// Create a new connection configuration.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Display-safe `host:port/database` target.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

/// Outcome of a connectivity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Success,
    Error,
}

/// Result of a Redshift connection test.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectionTestResult {
    /// "success" or "error"
    pub status: ConnectionStatus,
    pub connected: bool,
    /// Server version string, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Failure details, present on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Seconds since the Unix epoch when the test finished
    pub timestamp: f64,
}

impl ConnectionTestResult {
    /// Build a successful result.
    pub fn success(version: impl Into<String>, timestamp: f64) -> Self {
        Self {
            status: ConnectionStatus::Success,
            connected: true,
            version: Some(version.into()),
            message: None,
            timestamp,
        }
    }

    /// Build a failed result.
    pub fn failure(message: impl Into<String>, timestamp: f64) -> Self {
        Self {
            status: ConnectionStatus::Error,
            connected: false,
            version: None,
            message: Some(message.into()),
            timestamp,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConnectionStatus::Success
    }
}
