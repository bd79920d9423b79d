//! SELECT clauses.

use std::sync::LazyLock;

use regex::Regex;

use super::states::{
    AscendingDescending, Distinct, FromClause, GroupBy, GroupByClause, Having, Join, JoinClause,
    JoinOn, NoLockClause, OrderBy, OrderByClause, Select, SelectFrom, Top, TopClause,
    WhereClause,
};
use super::{Statement, join_list};
use crate::error::FluentSqlError;
use crate::params::Parameters;
use crate::types::JoinType;

static FIRST_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSELECT\b").expect("invalid built-in SELECT regex"));

// `TOP` goes after a leading `DISTINCT`: `SELECT TOP n DISTINCT` is not valid T-SQL.
static FIRST_SELECT_DISTINCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bSELECT(?: DISTINCT\b)?").expect("invalid built-in SELECT DISTINCT regex")
});

impl<'s> Statement<'s, Select> {
    /// Rewrite the first `SELECT` to `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Statement<'s, Distinct> {
        if let Some(query) = self.session.query.as_mut() {
            *query = FIRST_SELECT.replacen(query, 1, "SELECT DISTINCT").into_owned();
        }
        self.advance()
    }
}

impl<'s, S: TopClause> Statement<'s, S> {
    /// Limit the result to `rows` rows: `SELECT TOP n`, or `SELECT DISTINCT TOP n`.
    pub fn top(mut self, rows: u32) -> Statement<'s, Top> {
        if let Some(query) = self.session.query.as_mut() {
            *query = FIRST_SELECT_DISTINCT
                .replacen(query, 1, format!("${{0}} TOP {rows}"))
                .into_owned();
        }
        self.advance()
    }
}

impl<'s, S: FromClause> Statement<'s, S> {
    /// ` FROM table`
    pub fn from(mut self, table: &str) -> Statement<'s, SelectFrom> {
        self.push(&format!(" FROM {table}"));
        self.advance()
    }

    /// ` FROM table alias`
    pub fn from_as(mut self, table: &str, alias: &str) -> Statement<'s, SelectFrom> {
        self.push(&format!(" FROM {table} {alias}"));
        self.advance()
    }
}

impl<'s, S: NoLockClause> Statement<'s, S> {
    /// Append the `WITH (NOLOCK)` table hint to the preceding table source.
    pub fn with_no_lock(mut self) -> Statement<'s, S::Next> {
        self.push(" WITH (NOLOCK)");
        self.advance()
    }
}

impl<'s, S: JoinClause> Statement<'s, S> {
    /// Start a join; it cannot execute until [`on`](Statement::on) supplies the condition.
    pub fn join(mut self, table: &str, join_type: JoinType) -> Statement<'s, Join> {
        self.push(&format!(" {} JOIN {table}", join_type.keyword()));
        self.advance()
    }

    pub fn join_as(
        mut self,
        table: &str,
        alias: &str,
        join_type: JoinType,
    ) -> Statement<'s, Join> {
        self.push(&format!(" {} JOIN {table} {alias}", join_type.keyword()));
        self.advance()
    }
}

impl<'s> Statement<'s, Join> {
    pub fn on(mut self, condition: &str) -> Statement<'s, JoinOn> {
        self.push(&format!(" ON {condition}"));
        self.advance()
    }

    /// ` ON condition`, binding the condition's parameters.
    ///
    /// # Errors
    /// `FluentSqlError::ArgumentError` if a placeholder is already bound to another value.
    pub fn on_with(
        mut self,
        condition: &str,
        params: impl Into<Parameters>,
    ) -> Result<Statement<'s, JoinOn>, FluentSqlError> {
        self.bind_all(params.into())?;
        self.push(&format!(" ON {condition}"));
        Ok(self.advance())
    }
}

impl<'s, S: WhereClause> Statement<'s, S> {
    /// ` WHERE condition`
    ///
    /// Shared by SELECT, UPDATE and DELETE chains; an UPDATE or DELETE stays a non-query.
    pub fn where_clause(mut self, condition: &str) -> Statement<'s, S::Next> {
        self.push(&format!(" WHERE {condition}"));
        self.advance()
    }

    /// ` WHERE condition`, binding the condition's parameters.
    ///
    /// A placeholder may repeat a name bound earlier (by `set`, `on_with`, ...) only with
    /// the same value: `SET status = @status WHERE status = @status` has one `@status`.
    ///
    /// # Errors
    /// `FluentSqlError::ArgumentError` if a placeholder is already bound to another value;
    /// nothing is appended in that case.
    pub fn where_with(
        mut self,
        condition: &str,
        params: impl Into<Parameters>,
    ) -> Result<Statement<'s, S::Next>, FluentSqlError> {
        self.bind_all(params.into())?;
        self.push(&format!(" WHERE {condition}"));
        Ok(self.advance())
    }
}

impl<'s, S: GroupByClause> Statement<'s, S> {
    pub fn group_by<I, C>(mut self, columns: I) -> Statement<'s, GroupBy>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        self.push(&format!(" GROUP BY {}", join_list(columns)));
        self.advance()
    }
}

impl<'s> Statement<'s, GroupBy> {
    pub fn having(mut self, condition: &str) -> Statement<'s, Having> {
        self.push(&format!(" HAVING {condition}"));
        self.advance()
    }

    pub fn having_with(
        mut self,
        condition: &str,
        params: impl Into<Parameters>,
    ) -> Result<Statement<'s, Having>, FluentSqlError> {
        self.bind_all(params.into())?;
        self.push(&format!(" HAVING {condition}"));
        Ok(self.advance())
    }
}

impl<'s, S: OrderByClause> Statement<'s, S> {
    pub fn order_by<I, C>(mut self, columns: I) -> Statement<'s, OrderBy>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        self.push(&format!(" ORDER BY {}", join_list(columns)));
        self.advance()
    }
}

impl<'s> Statement<'s, OrderBy> {
    pub fn ascending(mut self) -> Statement<'s, AscendingDescending> {
        self.push(" ASC");
        self.advance()
    }

    pub fn descending(mut self) -> Statement<'s, AscendingDescending> {
        self.push(" DESC");
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::tests::session;
    use crate::types::{JoinType, RowValues};

    #[test]
    fn select_lists_columns() {
        let mut sql = session();
        assert_eq!(sql.select(["Id", "Name"]).query(), "SELECT Id, Name");
        assert_eq!(sql.select_all().query(), "SELECT *");
    }

    #[test]
    fn distinct_rewrites_only_the_first_select() {
        let mut sql = session();
        let stmt = sql
            .select(["(SELECT MAX(Id) FROM Audit) AS LastAudit"])
            .distinct();
        assert_eq!(
            stmt.query(),
            "SELECT DISTINCT (SELECT MAX(Id) FROM Audit) AS LastAudit"
        );
        assert_eq!(stmt.query().matches("SELECT DISTINCT").count(), 1);
    }

    #[test]
    fn top_goes_right_after_select() {
        let mut sql = session();
        let stmt = sql.select_all().top(5).from("T");
        assert_eq!(stmt.query(), "SELECT TOP 5 * FROM T");

        let stmt = sql.select(["SELECTED"]).top(3).from("T");
        assert_eq!(stmt.query(), "SELECT TOP 3 SELECTED FROM T");
    }

    #[test]
    fn top_after_distinct_stays_well_formed() {
        let mut sql = session();
        let stmt = sql.select(["Name"]).distinct().top(10).from("Users");
        assert_eq!(stmt.query(), "SELECT DISTINCT TOP 10 Name FROM Users");
    }

    #[test]
    fn full_chain_assembles_in_call_order() {
        let mut sql = session();
        let stmt = sql
            .select(["u.Name", "COUNT(o.Id) AS Orders"])
            .from_as("Users", "u")
            .with_no_lock()
            .join_as("Orders", "o", JoinType::Left)
            .on("o.UserId = u.Id")
            .with_no_lock()
            .where_with("u.Active = @active", [("active", true)])
            .unwrap()
            .group_by(["u.Name"])
            .having_with("COUNT(o.Id) > @min", [("min", 2)])
            .unwrap()
            .order_by(["u.Name"])
            .descending();
        assert_eq!(
            stmt.query(),
            "SELECT u.Name, COUNT(o.Id) AS Orders FROM Users u WITH (NOLOCK) \
             LEFT JOIN Orders o ON o.UserId = u.Id WITH (NOLOCK) \
             WHERE u.Active = @active GROUP BY u.Name HAVING COUNT(o.Id) > @min \
             ORDER BY u.Name DESC"
        );
        assert_eq!(stmt.parameters().get("active"), Some(&RowValues::Bool(true)));
        assert_eq!(stmt.parameters().get("@min"), Some(&RowValues::Int(2)));
    }

    #[test]
    fn join_keywords() {
        let mut sql = session();
        let stmt = sql
            .select_all()
            .from("A")
            .join("B", JoinType::default())
            .on("B.a = A.id");
        assert_eq!(stmt.query(), "SELECT * FROM A INNER JOIN B ON B.a = A.id");

        let stmt = sql
            .select_all()
            .from("A")
            .join("B", JoinType::FullOuter)
            .on_with("B.a = @a", [("a", 1)])
            .unwrap()
            .order_by(["A.id"])
            .ascending();
        assert_eq!(
            stmt.query(),
            "SELECT * FROM A FULL OUTER JOIN B ON B.a = @a ORDER BY A.id ASC"
        );
    }

    #[test]
    fn select_resets_parameters() {
        let mut sql = session();
        sql.select_all().from("T").where_with("x = @x", [("x", 1)]).unwrap();
        assert_eq!(sql.parameters().len(), 1);
        assert!(sql.select(["y"]).parameters().is_empty());
    }
}
