//! Named parameters and the `@` placeholder naming rules.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::FluentSqlError;
use crate::types::RowValues;

/// Marker that prefixes every T-SQL placeholder.
pub const PARAMETER_MARKER: char = '@';

/// Placeholder form of `name`: prefixed with `@` unless it already is.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    if name.starts_with(PARAMETER_MARKER) {
        name.to_string()
    } else {
        format!("{PARAMETER_MARKER}{name}")
    }
}

/// Bare form of `name`, with a single leading `@` removed.
#[must_use]
pub fn strip_marker(name: &str) -> &str {
    name.strip_prefix(PARAMETER_MARKER).unwrap_or(name)
}

/// Insertion-ordered map of placeholder names to values.
///
/// Names are normalized on insert, so `"id"` and `"@id"` address the same slot; binding a
/// name twice replaces the value and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: IndexMap<String, RowValues>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under the normalized form of `name`.
    pub fn bind(&mut self, name: &str, value: impl Into<RowValues>) {
        self.entries.insert(normalize_name(name), value.into());
    }

    /// Builder-style [`bind`](Self::bind).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<RowValues>) -> Self {
        self.bind(name, value);
        self
    }

    /// Bind every entry of `other`, in order, replacing values already bound.
    pub fn merge(&mut self, other: Parameters) {
        self.entries.extend(other.entries);
    }

    /// Bind every entry of `other`, refusing to rebind a name to a different value.
    ///
    /// Nothing is bound when a conflict is found.
    ///
    /// # Errors
    /// Returns `FluentSqlError::ArgumentError` naming the first conflicting placeholder.
    pub fn merge_disjoint(&mut self, other: Parameters) -> Result<(), FluentSqlError> {
        if let Some((name, _)) = other
            .entries
            .iter()
            .find(|(name, value)| self.entries.get(*name).is_some_and(|bound| bound != *value))
        {
            return Err(FluentSqlError::ArgumentError(format!(
                "{name} is already bound to a different value"
            )));
        }
        self.merge(other);
        Ok(())
    }

    /// Build parameters from the fields of a serializable struct or map.
    ///
    /// Field names become parameter names. `serde_json` orders object keys alphabetically,
    /// which is irrelevant for named binding.
    ///
    /// # Errors
    /// Returns `FluentSqlError::ParameterError` if `value` does not serialize to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, FluentSqlError> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |params, (name, value)| {
                    params.with(&name, RowValues::from_json(value))
                })),
            other => Err(FluentSqlError::ParameterError(format!(
                "expected an object with named fields, got {other}"
            ))),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.entries.get(&normalize_name(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Names (with `@`) in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: AsRef<str>,
    V: Into<RowValues>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.bind(name.as_ref(), value);
        }
        params
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Parameters
where
    K: AsRef<str>,
    V: Into<RowValues>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for Parameters
where
    K: AsRef<str>,
    V: Into<RowValues>,
{
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

/// `()` is the empty parameter set, for statements that bind nothing.
impl From<()> for Parameters {
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl IntoIterator for Parameters {
    type Item = (String, RowValues);
    type IntoIter = indexmap::map::IntoIter<String, RowValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
