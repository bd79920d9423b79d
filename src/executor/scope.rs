use tracing::{debug, trace, warn};

use super::{
    Command, ConnectionState, Connector, DbConnection, ExecuteOutcome, QueryOutcome,
};
use crate::error::FluentSqlError;

/// Which collaborator entry point a terminal needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Execute,
    Query,
}

enum Response {
    Executed(ExecuteOutcome),
    Queried(QueryOutcome),
}

/// Where a single command runs.
///
/// Inside a transaction the session's connection is reused as-is. Otherwise a fresh
/// connection is created, opened, used for this one command and closed again whether
/// the command succeeded or not.
pub(crate) struct ExecutionScope<'a> {
    pub(crate) connector: &'a dyn Connector,
    pub(crate) connection_string: &'a str,
    pub(crate) transaction: Option<&'a mut Box<dyn DbConnection>>,
}

impl ExecutionScope<'_> {
    pub(crate) async fn execute(
        self,
        command: &Command<'_>,
    ) -> Result<ExecuteOutcome, FluentSqlError> {
        match self.run(command, Request::Execute).await? {
            Response::Executed(outcome) => Ok(outcome),
            Response::Queried(outcome) => Ok(ExecuteOutcome {
                rows_affected: outcome.result_set.rows_affected,
                output_values: outcome.output_values,
            }),
        }
    }

    pub(crate) async fn query(self, command: &Command<'_>) -> Result<QueryOutcome, FluentSqlError> {
        match self.run(command, Request::Query).await? {
            Response::Queried(outcome) => Ok(outcome),
            Response::Executed(outcome) => Ok(QueryOutcome {
                output_values: outcome.output_values,
                ..QueryOutcome::default()
            }),
        }
    }

    async fn run(
        self,
        command: &Command<'_>,
        request: Request,
    ) -> Result<Response, FluentSqlError> {
        debug!(
            sql = command.text,
            kind = ?command.kind,
            params = command.parameters.len(),
            outputs = command.output_parameters.len(),
            timeout = ?command.timeout,
            in_transaction = self.transaction.is_some(),
            "dispatching command"
        );

        if let Some(conn) = self.transaction {
            return dispatch(conn.as_mut(), command, request).await;
        }

        let mut conn = self.connector.connect(self.connection_string).await?;
        let result = open_and_dispatch(conn.as_mut(), command, request).await;
        if let Err(err) = conn.close().await {
            warn!("failed to close connection after {:?} command: {err}", command.kind);
        } else {
            trace!("connection closed");
        }
        result
    }
}

async fn open_and_dispatch(
    conn: &mut dyn DbConnection,
    command: &Command<'_>,
    request: Request,
) -> Result<Response, FluentSqlError> {
    if conn.state() == ConnectionState::Closed {
        trace!("opening connection");
        conn.open().await?;
    }
    dispatch(conn, command, request).await
}

async fn dispatch(
    conn: &mut dyn DbConnection,
    command: &Command<'_>,
    request: Request,
) -> Result<Response, FluentSqlError> {
    match request {
        Request::Execute => conn.execute(command).await.map(Response::Executed),
        Request::Query => conn.query(command).await.map(Response::Queried),
    }
}
