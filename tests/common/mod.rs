//! Shared test fixtures: an in-memory connector and a recording reporter.

#![allow(dead_code)]

use async_trait::async_trait;
use redshift_mcp_server::db::{
    Connector, DbConnection, DriverError, ErrorClass, StatementOutcome,
};
use redshift_mcp_server::models::SqlValue;
use redshift_mcp_server::reporter::ErrorReporter;
use std::sync::{Arc, Mutex};

/// What the fake server does with the next statement.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return a result set
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
    /// Report an affected-row count without a result set
    Affected(u64),
    /// Fail the statement
    Fail(DriverError),
    /// Refuse the connection
    Refuse(DriverError),
}

impl Behavior {
    pub fn rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        Self::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// A server-side syntax error with the given primary message.
    pub fn syntax_error(message: &str) -> Self {
        Self::Fail(
            DriverError::new(
                ErrorClass::Database,
                format!("error returned from database: {message}"),
            )
            .with_message(message)
            .with_sql_state("42601"),
        )
    }

    pub fn refused(text: &str) -> Self {
        Self::Refuse(DriverError::new(ErrorClass::Connection, text))
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub opens: usize,
    pub closes: usize,
    pub statements: Vec<String>,
}

/// Connector whose connections answer every statement with one fixed behavior.
#[derive(Clone)]
pub struct MockConnector {
    behavior: Behavior,
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn opens(&self) -> usize {
        self.state.lock().unwrap().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, DriverError> {
        if let Behavior::Refuse(err) = &self.behavior {
            return Err(err.clone());
        }
        self.state.lock().unwrap().opens += 1;
        Ok(Box::new(MockConnection {
            behavior: self.behavior.clone(),
            state: self.state.clone(),
        }))
    }
}

struct MockConnection {
    behavior: Behavior,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl DbConnection for MockConnection {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, DriverError> {
        self.state.lock().unwrap().statements.push(sql.to_string());
        match &self.behavior {
            Behavior::Rows { columns, rows } => {
                Ok(StatementOutcome::rows(columns.clone(), rows.clone()))
            }
            Behavior::Affected(n) => Ok(StatementOutcome::affected(*n)),
            Behavior::Fail(err) | Behavior::Refuse(err) => Err(err.clone()),
        }
    }

    async fn close(self: Box<Self>) {
        self.state.lock().unwrap().closes += 1;
    }
}

/// Reporter that remembers every message.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
