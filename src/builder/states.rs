//! Marker types for the statement typestate, and the transitions between them.
//!
//! Each marker names a position in SQL grammar. Clause methods are only defined on
//! `Statement<'_, S>` for the markers where the clause is legal, so an out-of-order chain
//! (e.g. `having` before `group_by`, or executing a `join` without `on`) does not compile.
//!
//! The same chains in grammar order compile:
//!
//! ```no_run
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select(["Region"])
//!     .from("Sales")
//!     .group_by(["Region"])
//!     .having("COUNT(*) > 1")
//!     .to_dynamic()
//!     .await?;
//! sql.select_all().from("A").join("B", JoinType::Inner).on("B.a = A.id").to_dynamic().await?;
//! sql.insert_into("Users").values([("Name", "Ada")])?.execute().await?;
//! sql.update("Users").set([("Name", "Ada")])?.where_clause("Id = 1").execute().await?;
//! sql.select_all().top(5).from("Users").with_no_lock().to_dynamic().await?;
//! sql.select(["Name"]).distinct().top(1).from("Users").to_dynamic().await?;
//! # Ok(())
//! # }
//! ```
//!
//! `having` needs a `group_by` first:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select(["Region"]).from("Sales").having("COUNT(*) > 1").to_dynamic().await?;
//! # Ok(())
//! # }
//! ```
//!
//! A `join` has no terminals until its `on`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select_all().from("A").join("B", JoinType::Inner).to_dynamic().await?;
//! # Ok(())
//! # }
//! ```
//!
//! `insert_into` must be followed by `values`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.insert_into("Users").execute().await?;
//! # Ok(())
//! # }
//! ```
//!
//! `update` must be followed by `set`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.update("Users").execute().await?;
//! # Ok(())
//! # }
//! ```
//!
//! `update` has no WHERE before its `set`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.update("Users").where_clause("Id = 1");
//! # Ok(())
//! # }
//! ```
//!
//! `top` only goes before `from`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select_all().from("Users").top(5);
//! # Ok(())
//! # }
//! ```
//!
//! `with_no_lock` applies once per table:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select_all().from("Users").with_no_lock().with_no_lock();
//! # Ok(())
//! # }
//! ```
//!
//! Nothing runs before `from`:
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select_all().to_dynamic().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select(["Name"]).distinct().to_dynamic().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ```compile_fail
//! # use fluent_sql::prelude::*;
//! # async fn f(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
//! sql.select_all().top(1).to_dynamic().await?;
//! # Ok(())
//! # }
//! ```

mod sealed {
    pub trait Sealed {}
}

macro_rules! markers {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub enum $name {}
            impl sealed::Sealed for $name {}
        )*
    };
}

markers! {
    /// After `select` / `select_all`.
    Select,
    /// After `distinct`.
    Distinct,
    /// After `top`.
    Top,
    /// After `from`.
    SelectFrom,
    /// After `from(..).with_no_lock()`.
    SelectFromNoLock,
    /// After `join`; only `on` may follow.
    Join,
    /// After `join(..).on(..)`.
    JoinOn,
    /// After `on(..).with_no_lock()`.
    JoinOnNoLock,
    /// After `where` in a SELECT.
    SelectWhere,
    /// After `group_by`.
    GroupBy,
    /// After `having`.
    Having,
    /// After `order_by`.
    OrderBy,
    /// After `ascending` / `descending`.
    AscendingDescending,
    /// After `insert_into`; only `values` may follow.
    Insert,
    /// After `values`.
    InsertValues,
    /// After `update`; only `set` may follow.
    Update,
    /// After `set`.
    UpdateSet,
    /// After `delete_from`.
    Delete,
    /// After `where` in an UPDATE or DELETE.
    NonQueryWhere,
    /// After `store_procedure`.
    StoredProcedure,
    /// After an input parameter was added.
    StoredProcedureParameters,
    /// After an output parameter was added.
    StoredProcedureOutput,
}

/// States whose chain can run as a row-returning query.
pub trait QueryEnd: sealed::Sealed {}

/// States whose chain can run as INSERT / UPDATE / DELETE.
pub trait NonQueryEnd: sealed::Sealed {}

/// States accepting `top`.
pub trait TopClause: sealed::Sealed {}

/// States accepting `from`.
pub trait FromClause: sealed::Sealed {}

/// States accepting `with_no_lock`.
pub trait NoLockClause: sealed::Sealed {
    type Next;
}

/// States accepting `join`.
pub trait JoinClause: sealed::Sealed {}

/// States accepting `where`; SELECT and UPDATE/DELETE lead to different states.
pub trait WhereClause: sealed::Sealed {
    type Next;
}

/// States accepting `group_by`.
pub trait GroupByClause: sealed::Sealed {}

/// States accepting `order_by`.
pub trait OrderByClause: sealed::Sealed {}

/// Stored-procedure states accepting input parameters.
pub trait ParameterClause: sealed::Sealed {}

/// Stored-procedure states accepting output parameters.
pub trait OutputParameterClause: sealed::Sealed {}

macro_rules! impl_marker {
    ($tr:ident for $($state:ty),+) => {
        $(impl $tr for $state {})+
    };
}

impl_marker!(
    QueryEnd for SelectFrom, SelectFromNoLock, JoinOn, JoinOnNoLock, SelectWhere, GroupBy,
    Having, OrderBy, AscendingDescending
);
impl_marker!(NonQueryEnd for InsertValues, UpdateSet, Delete, NonQueryWhere);
impl_marker!(TopClause for Select, Distinct);
impl_marker!(FromClause for Select, Distinct, Top);
impl_marker!(JoinClause for SelectFrom, SelectFromNoLock);
impl_marker!(GroupByClause for SelectFrom, SelectFromNoLock, JoinOn, JoinOnNoLock, SelectWhere);
impl_marker!(
    OrderByClause for SelectFrom, SelectFromNoLock, JoinOn, JoinOnNoLock, SelectWhere, GroupBy,
    Having
);
impl_marker!(ParameterClause for StoredProcedure, StoredProcedureParameters);
impl_marker!(
    OutputParameterClause for StoredProcedure, StoredProcedureParameters, StoredProcedureOutput
);

impl NoLockClause for SelectFrom {
    type Next = SelectFromNoLock;
}

impl NoLockClause for JoinOn {
    type Next = JoinOnNoLock;
}

impl WhereClause for SelectFrom {
    type Next = SelectWhere;
}

impl WhereClause for SelectFromNoLock {
    type Next = SelectWhere;
}

impl WhereClause for JoinOn {
    type Next = SelectWhere;
}

impl WhereClause for JoinOnNoLock {
    type Next = SelectWhere;
}

impl WhereClause for UpdateSet {
    type Next = NonQueryWhere;
}

impl WhereClause for Delete {
    type Next = NonQueryWhere;
}
