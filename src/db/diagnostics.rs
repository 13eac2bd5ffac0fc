//! Driver-level errors and their normalization.
//!
//! `DriverError` is what a connection reports when connecting or executing
//! fails. It keeps the pieces a PostgreSQL-protocol server may send (primary
//! message, DETAIL field, SQLSTATE) next to the generic error text, so
//! `error_detail` can pick the most actionable one.

use sqlx::postgres::PgDatabaseError;
use std::fmt;
use thiserror::Error;

/// Broad origin of a driver failure, used as a textual marker in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The server rejected the statement (syntax, permissions, missing objects...)
    Database,
    /// Network, TLS, protocol or authentication handshake failure
    Connection,
    Timeout,
    /// A returned value could not be decoded
    Decode,
    Other,
}

impl ErrorClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Database => "DatabaseError",
            Self::Connection => "ConnectionError",
            Self::Timeout => "TimeoutError",
            Self::Decode => "DecodeError",
            Self::Other => "DriverError",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone)]
#[error("{text}")]
pub struct DriverError {
    class: ErrorClass,
    message: Option<String>,
    detail: Option<String>,
    /// e.g., "42601" for syntax error
    sql_state: Option<String>,
    text: String,
}

impl DriverError {
    /// Create an error carrying only its generic text.
    pub fn new(class: ErrorClass, text: impl Into<String>) -> Self {
        Self {
            class,
            message: None,
            detail: None,
            sql_state: None,
            text: text.into(),
        }
    }

    /// Set the server-emitted primary message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the server-emitted DETAIL field.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    pub fn class(&self) -> ErrorClass {
        self.class
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }
}

impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        let text = err.to_string();
        match &err {
            sqlx::Error::Database(db_err) => {
                let mut driver_err = DriverError::new(ErrorClass::Database, text)
                    .with_message(db_err.message());
                if let Some(code) = db_err.code() {
                    driver_err = driver_err.with_sql_state(code);
                }
                if let Some(detail) = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(PgDatabaseError::detail)
                {
                    driver_err = driver_err.with_detail(detail);
                }
                driver_err
            }
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolClosed => DriverError::new(ErrorClass::Connection, text),
            sqlx::Error::PoolTimedOut => DriverError::new(ErrorClass::Timeout, text),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DriverError::new(ErrorClass::Decode, text)
            }
            _ => DriverError::new(ErrorClass::Other, text),
        }
    }
}

/// Extract the most specific diagnostic text from a driver error.
///
/// Precedence: server primary message, then server detail, then the generic
/// error text.
pub fn error_detail(err: &DriverError) -> String {
    err.message()
        .filter(|m| !m.is_empty())
        .or_else(|| err.detail().filter(|d| !d.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}
