//! MCP service implementation using rmcp.
//!
//! This module defines the RedshiftService struct with all Redshift tools
//! exposed via the MCP protocol using the rmcp framework's macros.
//! Tool failures are sent to the client as `notifications/message` before the
//! error response.

use crate::db::{Connector, QueryExecutor};
use crate::models::ConnectionTestResult;
use crate::tools::connection::ConnectionToolHandler;
use crate::tools::query::{ExplainQueryInput, QueryToolHandler, RowsOutput, RunQueryInput};
use crate::tools::schema::{ListTablesInSchemaInput, SchemaToolHandler};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, Peer, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        Implementation, ProtocolVersion, ServerCapabilities, ServerInfo, SetLevelRequestParam,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::debug;

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "redshift-mcp-server";

#[derive(Clone)]
pub struct RedshiftService {
    /// Shared connection factory; every tool call opens its own connection
    connector: Arc<dyn Connector>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl RedshiftService {
    /// Create a new RedshiftService instance.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            tool_router: Self::tool_router(),
        }
    }

    fn executor(&self) -> QueryExecutor {
        QueryExecutor::new(self.connector.clone())
    }
}

#[tool_router]
impl RedshiftService {
    #[tool(
        description = "Execute a SQL statement on the Redshift cluster.\nReturns rows as column-to-value maps. Statements without a result set (INSERT, UPDATE, DELETE, DDL) return a single row with `affected_rows`."
    )]
    async fn run_query(
        &self,
        Parameters(input): Parameters<RunQueryInput>,
        peer: Peer<RoleServer>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let handler = QueryToolHandler::new(self.executor());
        handler
            .run_query(input, &peer)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Show the Redshift execution plan for a SQL statement.\nPass the statement without the EXPLAIN keyword; one plan line per row."
    )]
    async fn explain_query(
        &self,
        Parameters(input): Parameters<ExplainQueryInput>,
        peer: Peer<RoleServer>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let handler = QueryToolHandler::new(self.executor());
        handler
            .explain_query(input, &peer)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "List all schemas in the database with their owners.")]
    async fn list_schemas(&self, peer: Peer<RoleServer>) -> Result<Json<RowsOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.executor());
        handler
            .list_schemas(&peer)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "List tables and views in a schema.\nReturns table_name, table_type and table_schema for each entry."
    )]
    async fn list_tables_in_schema(
        &self,
        Parameters(input): Parameters<ListTablesInSchemaInput>,
        peer: Peer<RoleServer>,
    ) -> Result<Json<RowsOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.executor());
        handler
            .list_tables_in_schema(input, &peer)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Test connectivity to the Redshift cluster.\nReturns status, the server version on success, or an error message. Never fails the call."
    )]
    async fn test_connection(&self, peer: Peer<RoleServer>) -> Json<ConnectionTestResult> {
        let handler = ConnectionToolHandler::new(self.connector.clone());
        Json(handler.test_connection(&peer).await)
    }
}

#[tool_handler]
impl ServerHandler for RedshiftService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_logging()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("Redshift MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for querying an Amazon Redshift cluster.\n\
                \n\
                ## Workflow\n\
                1. Call `test_connection` to check the cluster is reachable\n\
                2. Call `list_schemas`, then `list_tables_in_schema` to explore\n\
                3. Use `run_query` for any SQL and `explain_query` for execution plans\n\
                \n\
                ## Notes\n\
                - Each call runs on its own connection in autocommit mode\n\
                - Statements are sent as-is; writes and DDL are not blocked\n\
                - Exact numerics, dates and timestamps are returned as text\n\
                - Errors are also sent as log notifications at level `error`"
                    .to_string(),
            ),
        }
    }

    async fn set_level(
        &self,
        request: SetLevelRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<(), McpError> {
        // Only error-level notifications are ever sent
        debug!(level = ?request.level, "Client requested log level");
        Ok(())
    }
}
