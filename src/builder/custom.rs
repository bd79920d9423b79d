//! Raw SQL escape hatch.
//!
//! Custom statements run through the same connection scoping as built ones (the
//! transaction connection when one is active) but leave the statement being built
//! untouched.

use serde::de::DeserializeOwned;

use super::FluentSql;
use crate::error::FluentSqlError;
use crate::params::Parameters;
use crate::results::CustomDbRow;

impl FluentSql {
    /// Run `sql` and return every row.
    ///
    /// ```rust,no_run
    /// # use fluent_sql::prelude::*;
    /// # async fn demo(sql: &mut FluentSql) -> Result<(), FluentSqlError> {
    /// let rows = sql
    ///     .execute_custom_query("SELECT Id FROM Users WHERE Email = @email", [("email", "a@b.c")])
    ///     .await?;
    /// let none = sql.execute_custom_query("SELECT 1 AS one", ()).await?;
    /// # let _ = (rows, none);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute_custom_query(
        &mut self,
        sql: &str,
        params: impl Into<Parameters>,
    ) -> Result<Vec<CustomDbRow>, FluentSqlError> {
        let params = params.into();
        let outcome = self.query_text(Some(sql), Some(&params)).await?;
        Ok(outcome.result_set.results)
    }

    pub async fn execute_custom_query_single(
        &mut self,
        sql: &str,
        params: impl Into<Parameters>,
    ) -> Result<Option<CustomDbRow>, FluentSqlError> {
        let params = params.into();
        let outcome = self.query_text(Some(sql), Some(&params)).await?;
        Ok(outcome.result_set.into_first())
    }

    pub async fn execute_custom_query_mapped<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: impl Into<Parameters>,
    ) -> Result<Vec<T>, FluentSqlError> {
        let params = params.into();
        let outcome = self.query_text(Some(sql), Some(&params)).await?;
        outcome.result_set.deserialize()
    }

    pub async fn execute_custom_query_mapped_single<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: impl Into<Parameters>,
    ) -> Result<Option<T>, FluentSqlError> {
        let params = params.into();
        let outcome = self.query_text(Some(sql), Some(&params)).await?;
        outcome
            .result_set
            .into_first()
            .map(|row| row.deserialize())
            .transpose()
    }

    /// Run a statement that returns no rows and report the affected-row count.
    pub async fn execute_custom_non_query(
        &mut self,
        sql: &str,
        params: impl Into<Parameters>,
    ) -> Result<usize, FluentSqlError> {
        let params = params.into();
        let outcome = self.execute_text(Some(sql), Some(&params)).await?;
        Ok(outcome.rows_affected)
    }
}
