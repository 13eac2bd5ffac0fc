//! Connection factory.
//!
//! Every tool call opens its own connection, runs one statement and closes it.
//! There is no pool: `Connector` builds a fresh `DbConnection` per call and
//! `ConnectionGuard` makes sure it is closed on every exit path.

use crate::db::diagnostics::{DriverError, ErrorClass, error_detail};
use crate::db::types::{column_names, decode_row};
use crate::error::{DbResult, RedshiftError};
use crate::models::{ConnectionConfig, SqlValue};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Column, Connection, Either, Executor, Statement};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// What the driver reports after one statement ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutcome {
    /// Column descriptor; `None` when the statement produced no result set
    pub columns: Option<Vec<String>>,
    /// Returned tuples, in column order
    pub rows: Vec<Vec<SqlValue>>,
    /// Affected-row count reported by the server
    pub rows_affected: u64,
}

impl StatementOutcome {
    /// Outcome of a row-producing statement.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: Some(columns),
            rows,
            rows_affected: 0,
        }
    }

    /// Outcome of a row-affecting statement.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            columns: None,
            rows: Vec::new(),
            rows_affected,
        }
    }
}

/// An open, single-use database connection.
#[async_trait]
pub trait DbConnection: Send {
    /// Execute the statement text verbatim and collect its full result.
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, DriverError>;

    /// Close the connection. Errors while closing are logged, not returned.
    async fn close(self: Box<Self>);
}

/// Builds new connections from static configuration.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DriverError>;
}

/// Open a connection and wrap it in a guard.
///
/// Connection failures become `RedshiftError::Connection` carrying the
/// normalized driver text.
pub async fn open_connection(connector: &dyn Connector) -> DbResult<ConnectionGuard> {
    match connector.connect().await {
        Ok(conn) => {
            debug!("Created new connection");
            Ok(ConnectionGuard::new(conn))
        }
        Err(e) => Err(RedshiftError::connection(error_detail(&e))),
    }
}

/// Scoped owner of one connection.
///
/// Call `release().await` on every path. If the guard is dropped without it
/// (for example when the request future is cancelled), `Drop` schedules the
/// close on the current runtime.
pub struct ConnectionGuard {
    conn: Option<Box<dyn DbConnection>>,
}

impl std::fmt::Debug for ConnectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("released", &self.conn.is_none())
            .finish()
    }
}

impl ConnectionGuard {
    fn new(conn: Box<dyn DbConnection>) -> Self {
        Self { conn: Some(conn) }
    }

    /// Execute one statement on the guarded connection.
    pub async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, DriverError> {
        match self.conn.as_mut() {
            Some(conn) => conn.execute(sql).await,
            None => Err(DriverError::new(
                ErrorClass::Connection,
                "connection already released",
            )),
        }
    }

    /// Close the connection.
    pub async fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close().await;
            debug!("Connection closed");
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    conn.close().await;
                    warn!("Connection closed via Drop - consider using explicit release()");
                });
            }
            // Without a runtime the socket is simply dropped.
            Err(_) => warn!("Connection dropped outside a runtime without a graceful close"),
        }
    }
}

// =============================================================================
// PostgreSQL-protocol connector
// =============================================================================

/// Connector for Redshift over the PostgreSQL wire protocol.
#[derive(Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
    connect_timeout: Duration,
    target: String,
}

// PgConnectOptions prints its password
impl std::fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnector")
            .field("target", &self.target)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl PgConnector {
    /// Create a connector for the given configuration with the default connect timeout.
    pub fn new(config: &ConnectionConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .application_name(env!("CARGO_PKG_NAME"));

        Self {
            options,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            target: config.target(),
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DriverError> {
        debug!(target_db = %self.target, "Connecting to Redshift");

        match timeout(self.connect_timeout, PgConnection::connect_with(&self.options)).await {
            Ok(Ok(conn)) => Ok(Box::new(PgDbConnection { conn })),
            Ok(Err(e)) => Err(DriverError::from(e)),
            Err(_) => Err(DriverError::new(
                ErrorClass::Timeout,
                format!(
                    "timeout expired after {}s connecting to {}",
                    self.connect_timeout.as_secs(),
                    self.target
                ),
            )),
        }
    }
}

/// Folds a simple-query response into the outcome of its last statement.
///
/// A query string may hold several statements. Each one ends with its own
/// completion message; rows belong to the statement that completes next.
#[derive(Debug, Default)]
pub(crate) struct ResultSets {
    columns: Option<Vec<String>>,
    rows: Vec<Vec<SqlValue>>,
    last: Option<StatementOutcome>,
}

impl ResultSets {
    pub(crate) fn push_row(
        &mut self,
        columns: impl FnOnce() -> Vec<String>,
        values: Vec<SqlValue>,
    ) {
        if self.columns.is_none() {
            self.columns = Some(columns());
        }
        self.rows.push(values);
    }

    pub(crate) fn complete(&mut self, rows_affected: u64) {
        self.last = Some(StatementOutcome {
            columns: self.columns.take(),
            rows: std::mem::take(&mut self.rows),
            rows_affected,
        });
    }

    pub(crate) fn finish(mut self) -> StatementOutcome {
        if self.columns.is_some() {
            let count = self.rows.len() as u64;
            self.complete(count);
        }
        self.last.unwrap_or_default()
    }
}

/// One open PostgreSQL-protocol connection.
pub struct PgDbConnection {
    conn: PgConnection,
}

impl PgDbConnection {
    /// Column names the server would return for `sql`, if it returns any.
    ///
    /// Used when a statement returned no rows, so an empty SELECT can be told
    /// apart from a row-affecting statement. Only Parse/Describe is sent; the
    /// statement is not run again and no catalog queries are issued.
    async fn statement_columns(&mut self, sql: &str) -> Option<Vec<String>> {
        match (&mut self.conn).prepare(sql).await {
            Ok(statement) if !statement.columns().is_empty() => Some(
                statement
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect(),
            ),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Prepare failed, treating statement as row-affecting");
                None
            }
        }
    }
}

#[async_trait]
impl DbConnection for PgDbConnection {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, DriverError> {
        let mut sets = ResultSets::default();

        // Raw SQL without arguments runs over the simple-query protocol
        {
            let mut stream = (&mut self.conn).fetch_many(sql);
            while let Some(step) = stream.try_next().await? {
                match step {
                    Either::Left(done) => sets.complete(done.rows_affected()),
                    Either::Right(row) => sets.push_row(|| column_names(&row), decode_row(&row)?),
                }
            }
        }

        let mut outcome = sets.finish();
        if outcome.columns.is_none() {
            outcome.columns = self.statement_columns(sql).await;
        }
        Ok(outcome)
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Error while closing connection");
        }
    }
}
