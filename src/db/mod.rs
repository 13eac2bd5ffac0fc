//! Database access layer.
//!
//! This module provides database access functionality:
//! - Per-call connections (`Connector`, `ConnectionGuard`)
//! - Statement execution and result formatting
//! - Driver error normalization
//! - Type mappings

pub mod connector;
pub mod diagnostics;
pub mod executor;
pub mod format;
pub mod types;

pub use connector::{
    ConnectionGuard, Connector, DEFAULT_CONNECT_TIMEOUT_SECS, DbConnection, PgConnector,
    StatementOutcome, open_connection,
};
pub use diagnostics::{DriverError, ErrorClass, error_detail};
pub use executor::{EMPTY_QUERY_MESSAGE, QueryExecutor};
pub use format::format_rows;
