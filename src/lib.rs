//! A typestate fluent builder for SQL Server statements.
//!
//! ```rust,no_run
//! use fluent_sql::prelude::*;
//!
//! # async fn demo() -> Result<(), FluentSqlError> {
//! let mut sql = FluentSql::connect("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=pw");
//!
//! sql.begin_transaction().await?;
//! sql.insert_into("Users")
//!     .values([("name", RowValues::from("Ada")), ("age", RowValues::from(36))])?
//!     .execute()
//!     .await?;
//! let created = sql
//!     .store_procedure("dbo.AuditUser")
//!     .with_parameter("name", "Ada")
//!     .with_output_parameter(OutputParameter::new("auditId", DbType::Int32))
//!     .execute_non_query()
//!     .await?;
//! sql.commit_transaction().await?;
//! # let _ = created.output("auditId");
//! # Ok(())
//! # }
//! ```
//!
//! Clauses can only be chained in SQL order: `group_by` needs a `from`, a `join` must be
//! completed by `on` before anything executes, and `values` / `set` are mandatory after
//! `insert_into` / `update`. See [`builder::states`].

pub mod blocking;
pub mod builder;
pub mod error;
pub mod executor;
#[cfg(feature = "mssql")]
pub mod mssql;
pub mod params;
pub mod prelude;
pub mod procedure;
pub mod results;
pub mod timeout;
pub mod translation;
pub mod types;

pub use builder::{FluentSql, Statement};
pub use error::FluentSqlError;
pub use params::Parameters;
pub use procedure::{OutputParameter, StoredProcedureWithOutputResult};
pub use results::{CustomDbRow, ResultSet};
pub use timeout::{clear_global_timeout, global_timeout, set_global_timeout};
pub use types::{DbType, JoinType, RowValues};
