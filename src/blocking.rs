//! Synchronous entry points.
//!
//! Every terminal is `async`. Callers without a runtime drive them through [`run`], which
//! blocks on a process-wide multi-threaded runtime created on first use:
//!
//! ```rust,no_run
//! # use fluent_sql::prelude::*;
//! # fn demo() -> Result<(), FluentSqlError> {
//! let mut sql = FluentSql::connect("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=pw");
//! let deleted = blocking::run(sql.delete_from("Sessions").where_clause("Expired = 1").execute())?;
//! # let _ = deleted;
//! # Ok(())
//! # }
//! ```
//!
//! Connections opened under `run` belong to that runtime, so a session used this way
//! should keep using `run` for the rest of its life.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::FluentSqlError;

static SHARED_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Block the current thread until `future` completes.
///
/// # Errors
/// The future's own error, or `FluentSqlError::Other` if the runtime cannot start or
/// `run` is called from inside an async context (where blocking would stall the caller's
/// executor).
pub fn run<F, T>(future: F) -> Result<T, FluentSqlError>
where
    F: Future<Output = Result<T, FluentSqlError>>,
{
    if Handle::try_current().is_ok() {
        return Err(FluentSqlError::Other(
            "blocking::run called from within an async runtime; await the future instead"
                .to_string(),
        ));
    }
    runtime()?.block_on(future)
}

/// Handle of the shared runtime, if [`run`] has started it.
pub(crate) fn shared_handle() -> Option<Handle> {
    SHARED_RUNTIME.get().map(|rt| rt.handle().clone())
}

fn runtime() -> Result<&'static Runtime, FluentSqlError> {
    if let Some(rt) = SHARED_RUNTIME.get() {
        return Ok(rt);
    }
    let rt = Builder::new_multi_thread()
        .enable_all()
        .thread_name("fluent-sql-blocking")
        .build()
        .map_err(|e| FluentSqlError::Other(format!("failed to start runtime: {e}")))?;
    Ok(SHARED_RUNTIME.get_or_init(|| rt))
}
