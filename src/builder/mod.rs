//! The fluent statement builder.
//!
//! [`FluentSql`] is the session: it owns the SQL text, the bound parameters, the
//! stored-procedure buffers and, while a transaction is active, the connection. Entry
//! methods hand out a [`Statement`] that mutably borrows the session and carries the
//! current grammar position as a marker type, see [`states`].
//!
//! A session is a sequential, single-caller object. The borrow checker already prevents
//! two chains on one session; sharing a session across tasks needs the caller's own
//! synchronization.

mod custom;
mod dml;
mod procedure;
mod select;
pub mod states;
mod terminal;
mod transaction;

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::FluentSqlError;
use crate::executor::{
    Command, Connector, DbConnection, ExecuteOutcome, ExecutionScope, QueryOutcome,
};
use crate::params::{Parameters, normalize_name};
use crate::procedure::{OutputParameter, ProcedureCall};
use crate::timeout::effective_timeout;
use crate::types::RowValues;

use states::{Delete, Insert, Select, StoredProcedure, Update};

/// A statement builder session bound to one connection string.
///
/// ```rust,no_run
/// # use fluent_sql::prelude::*;
/// # async fn demo() -> Result<(), FluentSqlError> {
/// let mut sql = FluentSql::connect("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=pw;TrustServerCertificate=true");
/// let users = sql
///     .select(["Id", "Name"])
///     .from("Users")
///     .where_with("Age > @age", [("age", 30)])?
///     .order_by(["Name"])
///     .to_dynamic()
///     .await?;
/// # let _ = users;
/// # Ok(())
/// # }
/// ```
pub struct FluentSql {
    connection_string: String,
    connector: Arc<dyn Connector>,
    query: Option<String>,
    parameters: Parameters,
    procedure: Option<ProcedureCall>,
    connection: Option<Box<dyn DbConnection>>,
    in_transaction: bool,
    timeout: Option<u32>,
}

impl FluentSql {
    /// Session over the bundled SQL Server collaborator.
    ///
    /// Nothing is opened until a statement executes or a transaction begins.
    #[cfg(feature = "mssql")]
    #[must_use]
    pub fn connect(connection_string: impl Into<String>) -> Self {
        Self::with_connector(connection_string, Arc::new(crate::mssql::MssqlConnector))
    }

    /// Session over a caller-supplied collaborator.
    #[must_use]
    pub fn with_connector(
        connection_string: impl Into<String>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            connection_string: connection_string.into(),
            connector,
            query: None,
            parameters: Parameters::new(),
            procedure: None,
            connection: None,
            in_transaction: false,
            timeout: None,
        }
    }

    /// Override the command timeout for this session, in seconds.
    pub fn set_timeout(&mut self, seconds: u32) -> &mut Self {
        self.timeout = Some(seconds);
        self
    }

    /// The session's timeout override; see [`crate::timeout`] for the process-wide default.
    #[must_use]
    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// SQL text accumulated by the current statement.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Parameters bound to the current statement.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Name of the stored procedure being built, if in stored-procedure mode.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.procedure.as_ref().map(|call| call.name.as_str())
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Start `SELECT c1, c2, ...`.
    pub fn select<I, C>(&mut self, columns: I) -> Statement<'_, Select>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let columns = join_list(columns);
        self.start_text(format!("SELECT {columns}"))
    }

    /// Start `SELECT *`.
    pub fn select_all(&mut self) -> Statement<'_, Select> {
        self.start_text("SELECT *".to_string())
    }

    /// Start `INSERT INTO table`.
    pub fn insert_into(&mut self, table: &str) -> Statement<'_, Insert> {
        self.start_text(format!("INSERT INTO {table}"))
    }

    /// Start `UPDATE table`.
    pub fn update(&mut self, table: &str) -> Statement<'_, Update> {
        self.start_text(format!("UPDATE {table}"))
    }

    /// Start `DELETE FROM table`.
    pub fn delete_from(&mut self, table: &str) -> Statement<'_, Delete> {
        self.start_text(format!("DELETE FROM {table}"))
    }

    /// Start a stored-procedure call, discarding any previous statement.
    pub fn store_procedure(&mut self, name: &str) -> Statement<'_, StoredProcedure> {
        self.query = None;
        self.parameters.clear();
        self.procedure = Some(ProcedureCall::new(name));
        Statement::new(self)
    }

    fn start_text<S>(&mut self, text: String) -> Statement<'_, S> {
        self.query = Some(text);
        self.parameters.clear();
        self.procedure = None;
        Statement::new(self)
    }

    fn scope<'a>(
        connector: &'a Arc<dyn Connector>,
        connection_string: &'a str,
        connection: &'a mut Option<Box<dyn DbConnection>>,
        in_transaction: bool,
    ) -> ExecutionScope<'a> {
        ExecutionScope {
            connector: connector.as_ref(),
            connection_string,
            transaction: connection.as_mut().filter(|_| in_transaction),
        }
    }

    async fn query_text(
        &mut self,
        text: Option<&str>,
        parameters: Option<&Parameters>,
    ) -> Result<QueryOutcome, FluentSqlError> {
        let command = Command::text(
            text.or(self.query.as_deref()).unwrap_or_default(),
            parameters.unwrap_or(&self.parameters),
            effective_timeout(self.timeout),
        );
        Self::scope(
            &self.connector,
            &self.connection_string,
            &mut self.connection,
            self.in_transaction,
        )
        .query(&command)
        .await
    }

    async fn execute_text(
        &mut self,
        text: Option<&str>,
        parameters: Option<&Parameters>,
    ) -> Result<ExecuteOutcome, FluentSqlError> {
        let command = Command::text(
            text.or(self.query.as_deref()).unwrap_or_default(),
            parameters.unwrap_or(&self.parameters),
            effective_timeout(self.timeout),
        );
        Self::scope(
            &self.connector,
            &self.connection_string,
            &mut self.connection,
            self.in_transaction,
        )
        .execute(&command)
        .await
    }

    /// Run the stored procedure as a non-query; outputs are keyed by bare name.
    async fn execute_procedure(
        &mut self,
    ) -> Result<(usize, HashMap<String, RowValues>), FluentSqlError> {
        let call = procedure_call(&self.procedure)?;
        let command = Command::stored_procedure(
            &call.name,
            &call.parameters,
            &call.output_parameters,
            effective_timeout(self.timeout),
        );
        let outcome = Self::scope(
            &self.connector,
            &self.connection_string,
            &mut self.connection,
            self.in_transaction,
        )
        .execute(&command)
        .await?;
        let outputs = read_outputs(&call.output_parameters, outcome.output_values);
        Ok((outcome.rows_affected, outputs))
    }

    /// Run the stored procedure as a query; outputs are keyed by bare name.
    async fn query_procedure(
        &mut self,
    ) -> Result<(crate::results::ResultSet, HashMap<String, RowValues>), FluentSqlError> {
        let call = procedure_call(&self.procedure)?;
        let command = Command::stored_procedure(
            &call.name,
            &call.parameters,
            &call.output_parameters,
            effective_timeout(self.timeout),
        );
        let outcome = Self::scope(
            &self.connector,
            &self.connection_string,
            &mut self.connection,
            self.in_transaction,
        )
        .query(&command)
        .await?;
        let outputs = read_outputs(&call.output_parameters, outcome.output_values);
        Ok((outcome.result_set, outputs))
    }
}

impl std::fmt::Debug for FluentSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluentSql")
            .field("query", &self.query)
            .field("parameters", &self.parameters)
            .field("procedure", &self.procedure)
            .field("in_transaction", &self.in_transaction)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Drop for FluentSql {
    fn drop(&mut self) {
        let Some(mut conn) = self.connection.take() else {
            return;
        };
        let in_transaction = std::mem::take(&mut self.in_transaction);
        match Handle::try_current().ok().or_else(crate::blocking::shared_handle) {
            Some(handle) => {
                debug!(in_transaction, "session dropped with a live connection; releasing it");
                handle.spawn(async move {
                    if in_transaction && let Err(err) = conn.rollback().await {
                        warn!("rollback on drop failed: {err}");
                    }
                    if let Err(err) = conn.close().await {
                        warn!("close on drop failed: {err}");
                    }
                });
            }
            None => {
                warn!(
                    in_transaction,
                    "session dropped outside a tokio runtime; the server will roll back when the connection is torn down"
                );
            }
        }
    }
}

fn procedure_call(procedure: &Option<ProcedureCall>) -> Result<&ProcedureCall, FluentSqlError> {
    procedure.as_ref().ok_or_else(|| {
        FluentSqlError::ExecutionError("no stored procedure has been started".to_string())
    })
}

/// Output values the collaborator bound, renamed to the declared (bare) names.
///
/// Declared parameters the collaborator did not bind are left out.
fn read_outputs(
    declared: &[OutputParameter],
    mut values: HashMap<String, RowValues>,
) -> HashMap<String, RowValues> {
    declared
        .iter()
        .filter_map(|param| {
            values
                .remove(&normalize_name(param.name()))
                .map(|value| (param.name().to_string(), value))
        })
        .collect()
}

fn join_list<I, C>(items: I) -> String
where
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A statement under construction, at grammar position `S`.
///
/// Clause methods consume the statement and return it at its next position; terminal
/// methods execute it. See [`states`] for the positions and what each allows.
#[must_use = "a statement does nothing until a terminal method is awaited"]
pub struct Statement<'s, S> {
    session: &'s mut FluentSql,
    _state: PhantomData<S>,
}

impl<'s, S> Statement<'s, S> {
    fn new(session: &'s mut FluentSql) -> Self {
        Self {
            session,
            _state: PhantomData,
        }
    }

    fn advance<N>(self) -> Statement<'s, N> {
        Statement::new(self.session)
    }

    fn into_session(self) -> &'s mut FluentSql {
        self.session
    }

    fn push(&mut self, fragment: &str) {
        self.session
            .query
            .get_or_insert_with(String::new)
            .push_str(fragment);
    }

    /// Bind clause parameters; a name already bound to another value is an error.
    fn bind_all(&mut self, parameters: Parameters) -> Result<(), FluentSqlError> {
        self.session.parameters.merge_disjoint(parameters)
    }

    /// SQL text in its current state.
    #[must_use]
    pub fn query(&self) -> &str {
        self.session.query.as_deref().unwrap_or_default()
    }

    /// Parameters bound so far.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.session.parameters
    }

    /// The session's timeout override.
    #[must_use]
    pub fn timeout(&self) -> Option<u32> {
        self.session.timeout
    }
}

impl<S> std::fmt::Debug for Statement<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("state", &std::any::type_name::<S>())
            .field("query", &self.query())
            .field("parameters", &self.parameters())
            .finish()
    }
}
