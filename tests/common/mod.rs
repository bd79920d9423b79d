#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fluent_sql::prelude::*;

/// Everything the builder asked of the data layer, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect(u32),
    Open(u32),
    Close(u32),
    Begin(u32),
    Commit(u32),
    Rollback(u32),
    Execute(u32, Recorded),
    Query(u32, Recorded),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub text: String,
    pub kind: CommandKind,
    pub params: Vec<(String, RowValues)>,
    pub outputs: Vec<String>,
    pub timeout: Option<u32>,
}

/// Canned responses and injected failures.
#[derive(Debug, Default)]
pub struct Script {
    pub rows_affected: usize,
    pub result_set: ResultSet,
    /// Output values the fake "procedure" binds, keyed `@name`.
    pub bound_outputs: HashMap<String, RowValues>,
    pub fail_commands: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
}

#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    script: Arc<Mutex<Script>>,
    next_id: Arc<AtomicU32>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> FluentSql {
        FluentSql::with_connector("Server=recorder", Arc::new(self.clone()))
    }

    pub fn script(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Commands that reached a connection, in order.
    pub fn commands(&self) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Execute(_, cmd) | Event::Query(_, cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Connector for Recorder {
    async fn connect(
        &self,
        _connection_string: &str,
    ) -> Result<Box<dyn DbConnection>, FluentSqlError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.push(Event::Connect(id));
        Ok(Box::new(FakeConnection {
            id,
            open: false,
            recorder: self.clone(),
        }))
    }
}

struct FakeConnection {
    id: u32,
    open: bool,
    recorder: Recorder,
}

impl FakeConnection {
    fn record(&self, command: &Command<'_>) -> Recorded {
        Recorded {
            text: command.text.to_string(),
            kind: command.kind,
            params: command
                .parameters
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            outputs: command
                .output_parameters
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            timeout: command.timeout,
        }
    }

    fn check(&self) -> Result<(), FluentSqlError> {
        if !self.open {
            return Err(FluentSqlError::ConnectionError("not open".into()));
        }
        if self.recorder.script.lock().unwrap().fail_commands {
            return Err(FluentSqlError::ExecutionError("scripted failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DbConnection for FakeConnection {
    fn state(&self) -> ConnectionState {
        if self.open {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    async fn open(&mut self) -> Result<(), FluentSqlError> {
        self.recorder.push(Event::Open(self.id));
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), FluentSqlError> {
        self.recorder.push(Event::Close(self.id));
        self.open = false;
        Ok(())
    }

    async fn begin_transaction(&mut self) -> Result<(), FluentSqlError> {
        self.recorder.push(Event::Begin(self.id));
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), FluentSqlError> {
        self.recorder.push(Event::Commit(self.id));
        if self.recorder.script.lock().unwrap().fail_commit {
            return Err(FluentSqlError::ExecutionError("commit refused".into()));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), FluentSqlError> {
        self.recorder.push(Event::Rollback(self.id));
        if self.recorder.script.lock().unwrap().fail_rollback {
            return Err(FluentSqlError::ExecutionError("rollback refused".into()));
        }
        Ok(())
    }

    async fn execute(&mut self, command: &Command<'_>) -> Result<ExecuteOutcome, FluentSqlError> {
        self.recorder.push(Event::Execute(self.id, self.record(command)));
        self.check()?;
        let script = self.recorder.script.lock().unwrap();
        Ok(ExecuteOutcome {
            rows_affected: script.rows_affected,
            output_values: script.bound_outputs.clone(),
        })
    }

    async fn query(&mut self, command: &Command<'_>) -> Result<QueryOutcome, FluentSqlError> {
        self.recorder.push(Event::Query(self.id, self.record(command)));
        self.check()?;
        let script = self.recorder.script.lock().unwrap();
        Ok(QueryOutcome {
            result_set: script.result_set.clone(),
            output_values: script.bound_outputs.clone(),
        })
    }
}

/// A result set with the given columns and rows.
pub fn rows(columns: &[&str], rows: Vec<Vec<RowValues>>) -> ResultSet {
    let mut set = ResultSet::with_capacity(rows.len());
    set.set_column_names(Arc::new(columns.iter().map(|c| c.to_string()).collect()));
    for row in rows {
        set.add_row_values(row);
    }
    set
}
