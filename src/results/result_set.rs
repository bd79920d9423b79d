use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::row::{CustomDbRow, index_columns};
use crate::error::FluentSqlError;
use crate::types::RowValues;

/// Rows of one result set, sharing a single column list.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub results: Vec<CustomDbRow>,
    /// Rows read into this set.
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Columns for every row added afterwards.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Some(Arc::new(index_columns(&column_names)));
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append one row of values in column order.
    ///
    /// Rows added before `set_column_names` are dropped, since they could not be
    /// addressed by column name.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        let (Some(column_names), Some(cache)) = (&self.column_names, &self.column_index_cache)
        else {
            return;
        };
        self.results.push(CustomDbRow::with_cache(
            column_names.clone(),
            row_values,
            cache.clone(),
        ));
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First row, consuming the set.
    #[must_use]
    pub fn into_first(self) -> Option<CustomDbRow> {
        self.results.into_iter().next()
    }

    /// Deserialize every row into `T`.
    ///
    /// # Errors
    /// Returns `FluentSqlError::MappingError` on the first row that cannot be mapped.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>, FluentSqlError> {
        self.results.iter().map(CustomDbRow::deserialize).collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = CustomDbRow;
    type IntoIter = std::vec::IntoIter<CustomDbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
