//! Terminals for SELECT and INSERT / UPDATE / DELETE chains.

use serde::de::DeserializeOwned;

use super::Statement;
use super::states::{NonQueryEnd, QueryEnd};
use crate::error::FluentSqlError;
use crate::results::CustomDbRow;

impl<S: QueryEnd> Statement<'_, S> {
    /// Run the query and return every row.
    pub async fn to_dynamic(self) -> Result<Vec<CustomDbRow>, FluentSqlError> {
        let outcome = self.into_session().query_text(None, None).await?;
        Ok(outcome.result_set.results)
    }

    /// Run the query and return the first row, or `None` when it produced none.
    pub async fn to_dynamic_single(self) -> Result<Option<CustomDbRow>, FluentSqlError> {
        let outcome = self.into_session().query_text(None, None).await?;
        Ok(outcome.result_set.into_first())
    }

    /// Run the query and deserialize every row into `T`, matching columns to fields by name.
    ///
    /// # Errors
    /// Besides execution errors, `FluentSqlError::MappingError` when a row does not fit `T`.
    pub async fn to_mapped_object<T: DeserializeOwned>(self) -> Result<Vec<T>, FluentSqlError> {
        let outcome = self.into_session().query_text(None, None).await?;
        outcome.result_set.deserialize()
    }

    pub async fn to_mapped_object_single<T: DeserializeOwned>(
        self,
    ) -> Result<Option<T>, FluentSqlError> {
        let outcome = self.into_session().query_text(None, None).await?;
        outcome
            .result_set
            .into_first()
            .map(|row| row.deserialize())
            .transpose()
    }
}

impl<S: NonQueryEnd> Statement<'_, S> {
    /// Run the statement and return the number of affected rows.
    pub async fn execute(self) -> Result<usize, FluentSqlError> {
        let outcome = self.into_session().execute_text(None, None).await?;
        Ok(outcome.rows_affected)
    }
}
