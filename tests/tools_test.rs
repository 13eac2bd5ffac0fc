//! Integration tests for the tool handlers against an in-memory connector.

mod common;

use common::{Behavior, MockConnector, RecordingReporter};
use redshift_mcp_server::db::QueryExecutor;
use redshift_mcp_server::models::{ConnectionStatus, SqlValue};
use redshift_mcp_server::tools::{
    ConnectionToolHandler, ExplainQueryInput, ListTablesInSchemaInput, QueryToolHandler,
    RunQueryInput, SchemaToolHandler, VERSION_PROBE_SQL,
};
use serde_json::json;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn query_handler(connector: &MockConnector) -> QueryToolHandler {
    QueryToolHandler::new(QueryExecutor::new(Arc::new(connector.clone())))
}

fn schema_handler(connector: &MockConnector) -> SchemaToolHandler {
    SchemaToolHandler::new(QueryExecutor::new(Arc::new(connector.clone())))
}

fn connection_handler(connector: &MockConnector) -> ConnectionToolHandler {
    ConnectionToolHandler::new(Arc::new(connector.clone()))
}

// =============================================================================
// run_query / explain_query
// =============================================================================

#[tokio::test]
async fn test_run_query_returns_rows() {
    let connector = MockConnector::new(Behavior::rows(
        &["id", "name"],
        vec![vec![SqlValue::Int(1), SqlValue::from("test")]],
    ));
    let reporter = RecordingReporter::new();

    let output = assert_ok!(
        query_handler(&connector)
            .run_query(
                RunQueryInput {
                    query: "SELECT id, name FROM t".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert_eq!(output.row_count, 1);
    assert_eq!(
        serde_json::to_value(&output.rows).unwrap(),
        json!([{"id": 1, "name": "test"}])
    );
    assert_eq!(connector.statements(), vec!["SELECT id, name FROM t"]);
}

#[tokio::test]
async fn test_run_query_serializes_in_column_order() {
    let connector = MockConnector::new(Behavior::rows(
        &["zulu", "alpha", "mike"],
        vec![vec![
            SqlValue::Int(1),
            SqlValue::Bool(true),
            SqlValue::Bytes(vec![0xde, 0xad]),
        ]],
    ));
    let reporter = RecordingReporter::new();

    let output = assert_ok!(
        query_handler(&connector)
            .run_query(
                RunQueryInput {
                    query: "SELECT zulu, alpha, mike FROM t".to_string(),
                },
                &reporter,
            )
            .await
    );

    let text = serde_json::to_string(&output).unwrap();
    assert_eq!(
        text,
        r#"{"rows":[{"zulu":1,"alpha":true,"mike":"3q0="}],"row_count":1}"#
    );
}

#[tokio::test]
async fn test_run_query_blank_does_not_connect() {
    let connector = MockConnector::new(Behavior::Affected(0));
    let reporter = RecordingReporter::new();

    let err = assert_err!(
        query_handler(&connector)
            .run_query(
                RunQueryInput {
                    query: "   ".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert!(err.is_invalid_operation());
    assert!(err.to_string().to_lowercase().contains("empty"));
    assert_eq!(connector.opens(), 0);
}

#[tokio::test]
async fn test_explain_query_prefixes_statement() {
    let connector = MockConnector::new(Behavior::rows(
        &["QUERY PLAN"],
        vec![vec![SqlValue::from("XN Result  (cost=0.00..0.01 rows=1 width=0)")]],
    ));
    let reporter = RecordingReporter::new();

    let output = assert_ok!(
        query_handler(&connector)
            .explain_query(
                ExplainQueryInput {
                    query: "SELECT 1".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert_eq!(connector.statements(), vec!["EXPLAIN SELECT 1"]);
    assert_eq!(output.row_count, 1);
    assert!(output.rows[0].get("QUERY PLAN").is_some());
}

#[tokio::test]
async fn test_explain_query_blank_does_not_connect() {
    let connector = MockConnector::new(Behavior::Affected(0));
    let reporter = RecordingReporter::new();

    let err = assert_err!(
        query_handler(&connector)
            .explain_query(
                ExplainQueryInput {
                    query: "\n".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert!(err.to_string().to_lowercase().contains("empty"));
    assert_eq!(connector.opens(), 0);
    assert_eq!(reporter.messages().len(), 1);
}

#[tokio::test]
async fn test_run_query_syntax_error_reports_once() {
    let connector = MockConnector::new(Behavior::syntax_error("syntax error at or near \"FORM\""));
    let reporter = RecordingReporter::new();

    let err = assert_err!(
        query_handler(&connector)
            .run_query(
                RunQueryInput {
                    query: "SELECT * FORM t".to_string(),
                },
                &reporter,
            )
            .await
    );

    let message = err.to_string();
    assert!(err.is_invalid_operation());
    assert!(message.contains("DatabaseError"));
    assert!(message.contains("syntax error at or near \"FORM\""));
    assert_eq!(reporter.messages().len(), 1);
    assert_eq!(connector.closes(), 1);

    let mcp_err: rmcp::ErrorData = err.into();
    assert_eq!(mcp_err.code.0, -32602);
}

// =============================================================================
// list_schemas / list_tables_in_schema
// =============================================================================

#[tokio::test]
async fn test_list_schemas() {
    let connector = MockConnector::new(Behavior::rows(
        &["schema_name", "schema_owner"],
        vec![
            vec![SqlValue::from("information_schema"), SqlValue::from("rdsdb")],
            vec![SqlValue::from("public"), SqlValue::from("rdsdb")],
        ],
    ));
    let reporter = RecordingReporter::new();

    let output = assert_ok!(schema_handler(&connector).list_schemas(&reporter).await);

    let statements = connector.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].contains("information_schema.schemata"));
    assert!(statements[0].ends_with("ORDER BY schema_name"));
    for row in &output.rows {
        assert_eq!(row.keys(), vec!["schema_name", "schema_owner"]);
    }
    assert_eq!(
        output.rows[1].get("schema_name"),
        Some(&SqlValue::from("public"))
    );
}

#[tokio::test]
async fn test_list_tables_in_schema_quotes_name() {
    let connector = MockConnector::new(Behavior::rows(
        &["table_name", "table_type", "table_schema"],
        vec![vec![
            SqlValue::from("orders"),
            SqlValue::from("BASE TABLE"),
            SqlValue::from("o'brien"),
        ]],
    ));
    let reporter = RecordingReporter::new();

    let output = assert_ok!(
        schema_handler(&connector)
            .list_tables_in_schema(
                ListTablesInSchemaInput {
                    schema_name: "o'brien".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert_eq!(output.row_count, 1);
    let statements = connector.statements();
    assert!(statements[0].contains("WHERE table_schema = 'o''brien'"));
    assert!(statements[0].ends_with("ORDER BY table_name"));
}

#[tokio::test]
async fn test_list_tables_in_schema_blank_does_not_connect() {
    let connector = MockConnector::new(Behavior::Affected(0));
    let reporter = RecordingReporter::new();

    let err = assert_err!(
        schema_handler(&connector)
            .list_tables_in_schema(
                ListTablesInSchemaInput {
                    schema_name: " ".to_string(),
                },
                &reporter,
            )
            .await
    );

    assert!(err.is_invalid_operation());
    assert_eq!(err.to_string(), "Empty schema name provided");
    assert_eq!(connector.opens(), 0);
    assert_eq!(reporter.messages(), vec!["Empty schema name provided".to_string()]);
}

#[tokio::test]
async fn test_list_tables_in_schema_wraps_failure() {
    let connector = MockConnector::new(Behavior::syntax_error("permission denied for schema audit"));
    let reporter = RecordingReporter::new();

    let err = assert_err!(
        schema_handler(&connector)
            .list_tables_in_schema(
                ListTablesInSchemaInput {
                    schema_name: "audit".to_string(),
                },
                &reporter,
            )
            .await
    );

    let message = err.to_string();
    assert!(message.starts_with("Failed to list tables in schema 'audit': Query execution failed:"));
    assert!(message.contains("permission denied for schema audit"));
    assert_eq!(connector.closes(), 1);
}

// =============================================================================
// test_connection
// =============================================================================

#[tokio::test]
async fn test_connection_success_is_repeatable() {
    let connector = MockConnector::new(Behavior::rows(
        &["version"],
        vec![vec![SqlValue::from(
            "PostgreSQL 8.0.2 on i686-pc-linux-gnu, Redshift 1.0.77467",
        )]],
    ));
    let reporter = RecordingReporter::new();
    let handler = connection_handler(&connector);

    let mut last_timestamp = 0.0;
    for _ in 0..3 {
        let result = handler.test_connection(&reporter).await;
        assert_eq!(result.status, ConnectionStatus::Success);
        assert!(result.connected);
        assert!(result.version.as_deref().unwrap().contains("Redshift"));
        assert!(result.timestamp >= last_timestamp);
        last_timestamp = result.timestamp;
    }

    assert_eq!(connector.statements(), vec![VERSION_PROBE_SQL; 3]);
    assert_eq!(connector.opens(), connector.closes());
    assert!(reporter.messages().is_empty());
}

#[tokio::test]
async fn test_connection_unreachable_never_raises() {
    let connector = MockConnector::new(Behavior::refused("timeout expired after 10s"));
    let reporter = RecordingReporter::new();
    let handler = connection_handler(&connector);

    for _ in 0..3 {
        let result = handler.test_connection(&reporter).await;
        assert_eq!(result.status, ConnectionStatus::Error);
        assert!(!result.connected);
        assert!(result.version.is_none());
        let message = result.message.unwrap();
        assert!(message.starts_with("Connection test failed: "));
        assert!(message.contains("timeout expired after 10s"));
    }

    assert_eq!(reporter.messages().len(), 3);
}

#[tokio::test]
async fn test_connection_probe_failure_releases_connection() {
    let connector = MockConnector::new(Behavior::syntax_error("function version() does not exist"));
    let reporter = RecordingReporter::new();

    let result = connection_handler(&connector).test_connection(&reporter).await;

    assert_eq!(result.status, ConnectionStatus::Error);
    assert_eq!(
        result.message.as_deref(),
        Some("Connection test failed: function version() does not exist")
    );
    assert_eq!(connector.closes(), 1);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["connected"], false);
    assert!(json.get("version").is_none());
}
