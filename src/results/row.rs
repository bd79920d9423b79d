use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::FluentSqlError;
use crate::types::RowValues;

/// One row of a [`super::ResultSet`], addressable by column name or ordinal.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// Column names, shared with the other rows of the set.
    pub column_names: Arc<Vec<String>>,
    /// Values in column order.
    pub rows: Vec<RowValues>,
    // Shared with every row of the same result set.
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let column_index_cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        rows: Vec<RowValues>,
        column_index_cache: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    /// Ordinal of `column`; exact matches win over case-insensitive ones.
    #[must_use]
    pub fn column_ordinal(&self, column: &str) -> Option<usize> {
        if let Some(&ordinal) = self.column_index_cache.get(column) {
            return Some(ordinal);
        }

        // SQL Server column names are case-insensitive under the default collation
        self.column_names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RowValues> {
        self.column_ordinal(column)
            .and_then(|ordinal| self.rows.get(ordinal))
    }

    #[must_use]
    pub fn get_ordinal(&self, ordinal: usize) -> Option<&RowValues> {
        self.rows.get(ordinal)
    }

    /// Column name / value pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter())
    }

    /// The row as a JSON object keyed by column name.
    ///
    /// When a column name repeats (e.g. `SELECT a.id, b.id`), the last value wins.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        JsonValue::Object(map)
    }

    /// Map the row onto `T` by column name.
    ///
    /// # Errors
    /// Returns `FluentSqlError::MappingError` if a field is missing or has an incompatible type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FluentSqlError> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(ordinal, name)| (name.clone(), ordinal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn row() -> CustomDbRow {
        CustomDbRow::new(
            Arc::new(vec!["Id".into(), "Name".into(), "Score".into()]),
            vec![
                RowValues::Int(1),
                RowValues::Text("Ada".into()),
                RowValues::Null,
            ],
        )
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let row = row();
        assert_eq!(row.get("Id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("name"), Some(&RowValues::Text("Ada".into())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_ordinal(2), Some(&RowValues::Null));
    }

    #[test]
    fn maps_onto_struct() {
        #[derive(Deserialize, Debug, PartialEq)]
        #[serde(rename_all = "PascalCase")]
        struct User {
            id: i64,
            name: String,
            score: Option<f64>,
        }

        let user: User = row().deserialize().unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "Ada".into(),
                score: None
            }
        );
    }

    #[test]
    fn mapping_reports_missing_fields() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Other {
            email: String,
        }

        let err = row().deserialize::<Other>().unwrap_err();
        assert!(matches!(err, FluentSqlError::MappingError(_)));
    }
}
