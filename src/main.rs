//! Redshift MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to run SQL against an Amazon Redshift cluster.

use redshift_mcp_server::config::{Config, TransportMode};
use redshift_mcp_server::db::{Connector, PgConnector};
use redshift_mcp_server::error::{DbResult, RedshiftError};
use redshift_mcp_server::reporter::TracingReporter;
use redshift_mcp_server::tools::ConnectionToolHandler;
use redshift_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

/// Check the cluster is reachable before serving.
async fn probe_cluster(connector: Arc<dyn Connector>) -> DbResult<()> {
    let result = ConnectionToolHandler::new(connector)
        .test_connection(&TracingReporter)
        .await;

    if result.is_success() {
        info!(
            version = result.version.as_deref().unwrap_or_default(),
            "Connected to Redshift"
        );
        Ok(())
    } else {
        Err(RedshiftError::configuration(format!(
            "Redshift connection test failed: {}",
            result.message.unwrap_or_default()
        )))
    }
}

async fn run(config: Config) -> DbResult<()> {
    let conn_config = config.connection_config()?;
    info!(target_db = %conn_config.target(), "Using Redshift cluster");

    let connector: Arc<dyn Connector> = Arc::new(
        PgConnector::new(&conn_config).with_connect_timeout(config.connect_timeout_duration()),
    );

    probe_cluster(connector.clone()).await?;

    match config.transport() {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            StdioTransport::new(connector).run().await
        }
        TransportMode::Http => {
            info!(
                addr = %config.http_bind_addr(),
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(connector, &config.host, config.port, &config.mcp_endpoint)
                .run()
                .await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    init_tracing(&config);

    info!(
        transport = %config.transport(),
        "Starting Redshift MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(config).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
