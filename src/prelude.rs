//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::blocking;
pub use crate::builder::{FluentSql, Statement};
pub use crate::error::FluentSqlError;
pub use crate::executor::{
    Command, CommandKind, ConnectionState, Connector, DbConnection, ExecuteOutcome, QueryOutcome,
};
pub use crate::params::Parameters;
pub use crate::procedure::{OutputParameter, StoredProcedureWithOutputResult};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::timeout::{clear_global_timeout, global_timeout, set_global_timeout};
pub use crate::types::{DbType, JoinType, RowValues};

#[cfg(feature = "mssql")]
pub use crate::mssql::{MssqlConnector, MssqlOptions, MssqlOptionsBuilder};
