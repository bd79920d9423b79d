//! The data-access seam the builder executes through.
//!
//! A [`Connector`] turns a connection string into a [`DbConnection`]; the connection
//! runs [`Command`]s and owns the (connection-scoped) transaction. The bundled SQL Server
//! implementation lives in [`crate::mssql`]; tests plug in their own.

mod scope;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FluentSqlError;
use crate::params::Parameters;
use crate::procedure::OutputParameter;
use crate::results::ResultSet;
use crate::types::RowValues;

pub(crate) use scope::ExecutionScope;

/// How the collaborator should interpret [`Command::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Ad-hoc SQL text with `@name` placeholders.
    Text,
    /// Name of a stored procedure to invoke with the bound parameters.
    StoredProcedure,
}

/// Physical state of a connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// One statement or procedure call handed to the collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
    pub text: &'a str,
    pub kind: CommandKind,
    /// Input parameters, keyed by `@name`.
    pub parameters: &'a Parameters,
    /// Output bindings, each declared with a null initial value.
    pub output_parameters: &'a [OutputParameter],
    /// Command timeout in seconds; `None` leaves the driver default.
    pub timeout: Option<u32>,
}

impl<'a> Command<'a> {
    #[must_use]
    pub fn text(text: &'a str, parameters: &'a Parameters, timeout: Option<u32>) -> Self {
        Self {
            text,
            kind: CommandKind::Text,
            parameters,
            output_parameters: &[],
            timeout,
        }
    }

    #[must_use]
    pub fn stored_procedure(
        name: &'a str,
        parameters: &'a Parameters,
        output_parameters: &'a [OutputParameter],
        timeout: Option<u32>,
    ) -> Self {
        Self {
            text: name,
            kind: CommandKind::StoredProcedure,
            parameters,
            output_parameters,
            timeout,
        }
    }
}

/// Result of a non-query command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteOutcome {
    pub rows_affected: usize,
    /// Resolved output values, keyed by the `@name` the collaborator actually bound.
    pub output_values: HashMap<String, RowValues>,
}

/// Result of a row-returning command.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub result_set: ResultSet,
    /// Resolved output values, keyed by the `@name` the collaborator actually bound.
    pub output_values: HashMap<String, RowValues>,
}

/// Opens connection handles for a connection string.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Create a handle for `connection_string`. The handle may start closed.
    async fn connect(&self, connection_string: &str)
    -> Result<Box<dyn DbConnection>, FluentSqlError>;
}

/// A single physical connection, plus the transaction running on it.
#[async_trait]
pub trait DbConnection: Send {
    fn state(&self) -> ConnectionState;

    async fn open(&mut self) -> Result<(), FluentSqlError>;

    /// Close the connection. Closing a closed handle is a no-op.
    async fn close(&mut self) -> Result<(), FluentSqlError>;

    async fn begin_transaction(&mut self) -> Result<(), FluentSqlError>;

    async fn commit(&mut self) -> Result<(), FluentSqlError>;

    async fn rollback(&mut self) -> Result<(), FluentSqlError>;

    /// Run a command that returns an affected-row count.
    async fn execute(&mut self, command: &Command<'_>) -> Result<ExecuteOutcome, FluentSqlError>;

    /// Run a command that returns rows.
    async fn query(&mut self, command: &Command<'_>) -> Result<QueryOutcome, FluentSqlError>;
}
