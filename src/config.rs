//! Configuration handling for the Redshift MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! Cluster settings come from the `REDSHIFT_*` variables; every one of them can
//! also be passed as a flag.

use crate::db::DEFAULT_CONNECT_TIMEOUT_SECS;
use crate::error::{DbResult, RedshiftError};
use crate::models::{ConnectionConfig, DEFAULT_REDSHIFT_PORT};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8888;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP with Server-Sent Events responses (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Server configuration.
#[derive(Clone, Parser)]
#[command(
    name = "redshift-mcp-server",
    about = "MCP server for Amazon Redshift - run queries, explain plans and browse schemas",
    version
)]
pub struct Config {
    /// Serve over HTTP with Server-Sent Events instead of stdio
    #[arg(long)]
    pub sse: bool,

    /// HTTP port to bind to (only used with --sse)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// HTTP host to bind to (only used with --sse)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub host: String,

    /// MCP endpoint path (only used with --sse)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Redshift cluster endpoint
    #[arg(long, env = "REDSHIFT_HOST")]
    pub redshift_host: Option<String>,

    /// Redshift port
    #[arg(long, default_value_t = DEFAULT_REDSHIFT_PORT, env = "REDSHIFT_PORT")]
    pub redshift_port: u16,

    /// Database name
    #[arg(long, env = "REDSHIFT_DATABASE")]
    pub redshift_database: Option<String>,

    /// Database user
    #[arg(long, env = "REDSHIFT_USER")]
    pub redshift_user: Option<String>,

    /// Database password
    #[arg(long, env = "REDSHIFT_PASSWORD", hide_env_values = true)]
    pub redshift_password: Option<String>,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("sse", &self.sse)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("mcp_endpoint", &self.mcp_endpoint)
            .field("redshift_host", &self.redshift_host)
            .field("redshift_port", &self.redshift_port)
            .field("redshift_database", &self.redshift_database)
            .field("redshift_user", &self.redshift_user)
            .field(
                "redshift_password",
                &self.redshift_password.as_ref().map(|_| "****"),
            )
            .field("connect_timeout", &self.connect_timeout)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            sse: false,
            port: DEFAULT_HTTP_PORT,
            host: DEFAULT_HTTP_HOST.to_string(),
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            redshift_host: None,
            redshift_port: DEFAULT_REDSHIFT_PORT,
            redshift_database: None,
            redshift_user: None,
            redshift_password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }

    /// Transport selected by `--sse`.
    pub fn transport(&self) -> TransportMode {
        if self.sse {
            TransportMode::Http
        } else {
            TransportMode::Stdio
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Validate the cluster settings and build the connection configuration.
    ///
    /// Missing or empty values are a `Configuration` error naming every
    /// variable that needs to be set.
    pub fn connection_config(&self) -> DbResult<ConnectionConfig> {
        let settings = [
            ("REDSHIFT_HOST", &self.redshift_host),
            ("REDSHIFT_DATABASE", &self.redshift_database),
            ("REDSHIFT_USER", &self.redshift_user),
            ("REDSHIFT_PASSWORD", &self.redshift_password),
        ];

        let missing: Vec<&str> = settings
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(RedshiftError::configuration(format!(
                "Missing Redshift connection parameters. Set the following environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(ConnectionConfig::new(
            self.redshift_host.as_deref().unwrap_or_default(),
            self.redshift_port,
            self.redshift_database.as_deref().unwrap_or_default(),
            self.redshift_user.as_deref().unwrap_or_default(),
            self.redshift_password.as_deref().unwrap_or_default(),
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
