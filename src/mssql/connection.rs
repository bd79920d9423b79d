use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tiberius::{Config, Query};
use tracing::{debug, trace};

use super::batch::{ROW_COUNT_COLUMN, exec_statement, output_batch};
use super::client::{MssqlClient, connect_client};
use super::config::parse_connection_string;
use super::query::{execute, query_result_sets};
use crate::error::FluentSqlError;
use crate::executor::{
    Command, CommandKind, ConnectionState, Connector, DbConnection, ExecuteOutcome, QueryOutcome,
};
use crate::params::normalize_name;
use crate::results::ResultSet;
use crate::translation::translate_placeholders;
use crate::types::RowValues;

/// [`Connector`] for SQL Server over tiberius.
///
/// Connection strings use the ADO.NET format understood by
/// [`tiberius::Config::from_ado_string`]; see [`super::MssqlOptionsBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlConnector;

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(
        &self,
        connection_string: &str,
    ) -> Result<Box<dyn DbConnection>, FluentSqlError> {
        let config = parse_connection_string(connection_string)?;
        Ok(Box::new(MssqlConnection::new(config)))
    }
}

/// One SQL Server connection; closed until [`DbConnection::open`].
pub struct MssqlConnection {
    config: Config,
    client: Option<MssqlClient>,
}

impl MssqlConnection {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: None,
        }
    }

    fn client(&mut self) -> Result<&mut MssqlClient, FluentSqlError> {
        self.client
            .as_mut()
            .ok_or_else(|| FluentSqlError::ConnectionError("connection is not open".to_string()))
    }

    async fn batch(&mut self, sql: &str) -> Result<(), FluentSqlError> {
        Query::new(sql).execute(self.client()?).await?;
        Ok(())
    }

    /// A timed-out request leaves the TDS stream mid-response, so the client is dropped.
    fn discard_on_timeout<T>(&mut self, result: &Result<T, FluentSqlError>) {
        if matches!(result, Err(FluentSqlError::Timeout(_))) {
            debug!("dropping SQL Server connection after timeout");
            self.client = None;
        }
    }
}

#[async_trait]
impl DbConnection for MssqlConnection {
    fn state(&self) -> ConnectionState {
        if self.client.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    async fn open(&mut self) -> Result<(), FluentSqlError> {
        if self.client.is_none() {
            self.client = Some(connect_client(self.config.clone()).await?);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), FluentSqlError> {
        if let Some(client) = self.client.take() {
            trace!("closing SQL Server connection");
            client.close().await?;
        }
        Ok(())
    }

    async fn begin_transaction(&mut self) -> Result<(), FluentSqlError> {
        self.batch("BEGIN TRANSACTION").await
    }

    async fn commit(&mut self) -> Result<(), FluentSqlError> {
        self.batch("COMMIT TRANSACTION").await
    }

    async fn rollback(&mut self) -> Result<(), FluentSqlError> {
        self.batch("ROLLBACK TRANSACTION").await
    }

    async fn execute(&mut self, command: &Command<'_>) -> Result<ExecuteOutcome, FluentSqlError> {
        let client = self.client()?;
        let result = with_timeout(command.timeout, execute_command(client, command)).await;
        self.discard_on_timeout(&result);
        result
    }

    async fn query(&mut self, command: &Command<'_>) -> Result<QueryOutcome, FluentSqlError> {
        let client = self.client()?;
        let result = with_timeout(command.timeout, query_command(client, command)).await;
        self.discard_on_timeout(&result);
        result
    }
}

async fn execute_command(
    client: &mut MssqlClient,
    command: &Command<'_>,
) -> Result<ExecuteOutcome, FluentSqlError> {
    match command.kind {
        CommandKind::Text => {
            let rows_affected = execute(client, &text_sql(command), command.parameters).await?;
            Ok(ExecuteOutcome {
                rows_affected,
                output_values: HashMap::new(),
            })
        }
        CommandKind::StoredProcedure if command.output_parameters.is_empty() => {
            let sql = exec_statement(command.text, command.parameters, &[]);
            let rows_affected = execute(client, &sql, command.parameters).await?;
            Ok(ExecuteOutcome {
                rows_affected,
                output_values: HashMap::new(),
            })
        }
        CommandKind::StoredProcedure => {
            let sql = output_batch(
                command.text,
                command.parameters,
                command.output_parameters,
                true,
            );
            let sets = query_result_sets(client, &sql, command.parameters).await?;
            let mut output_values = read_back(sets.last());
            let rows_affected = match output_values.remove(&normalize_name(ROW_COUNT_COLUMN)) {
                Some(RowValues::Int(n)) => usize::try_from(n).unwrap_or_default(),
                _ => 0,
            };
            Ok(ExecuteOutcome {
                rows_affected,
                output_values,
            })
        }
    }
}

async fn query_command(
    client: &mut MssqlClient,
    command: &Command<'_>,
) -> Result<QueryOutcome, FluentSqlError> {
    match command.kind {
        CommandKind::Text => {
            let sets = query_result_sets(client, &text_sql(command), command.parameters).await?;
            Ok(QueryOutcome {
                result_set: sets.into_iter().next().unwrap_or_default(),
                output_values: HashMap::new(),
            })
        }
        CommandKind::StoredProcedure if command.output_parameters.is_empty() => {
            let sql = exec_statement(command.text, command.parameters, &[]);
            let sets = query_result_sets(client, &sql, command.parameters).await?;
            Ok(QueryOutcome {
                result_set: sets.into_iter().next().unwrap_or_default(),
                output_values: HashMap::new(),
            })
        }
        CommandKind::StoredProcedure => {
            let sql = output_batch(
                command.text,
                command.parameters,
                command.output_parameters,
                false,
            );
            let mut sets = query_result_sets(client, &sql, command.parameters).await?;
            let output_values = read_back(sets.last());
            // The read-back row is always last; anything before it came from the procedure.
            sets.pop();
            Ok(QueryOutcome {
                result_set: sets.into_iter().next().unwrap_or_default(),
                output_values,
            })
        }
    }
}

fn text_sql<'a>(command: &Command<'a>) -> std::borrow::Cow<'a, str> {
    let bound: Vec<&str> = command.parameters.names().collect();
    translate_placeholders(command.text, &bound)
}

/// Output values from the read-back row, keyed `@name`.
fn read_back(set: Option<&ResultSet>) -> HashMap<String, RowValues> {
    set.and_then(|set| set.results.first())
        .map(|row| {
            row.iter()
                .map(|(column, value)| (normalize_name(column), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

async fn with_timeout<T>(
    timeout: Option<u32>,
    fut: impl Future<Output = Result<T, FluentSqlError>>,
) -> Result<T, FluentSqlError> {
    match timeout {
        Some(seconds) if seconds > 0 => {
            tokio::time::timeout(Duration::from_secs(u64::from(seconds)), fut)
                .await
                .map_err(|_| FluentSqlError::Timeout(seconds))?
        }
        _ => fut.await,
    }
}
