use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// Every bound parameter and every column read back from the server is one of these:
/// ```rust
/// use fluent_sql::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render the value as JSON, the intermediate form used to map rows onto caller types.
    ///
    /// Timestamps become ISO-8601 strings (the format `chrono`'s serde support reads back),
    /// blobs become arrays of bytes and non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Timestamp(dt) => {
                JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(value) => value.clone(),
            RowValues::Blob(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
        }
    }

    /// Convert a JSON value into a bindable parameter.
    ///
    /// Arrays and objects are kept as `JSON` and sent as their text form.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => RowValues::Null,
            JsonValue::Bool(b) => RowValues::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => RowValues::Int(i),
                None => n.as_f64().map_or(RowValues::Null, RowValues::Float),
            },
            JsonValue::String(s) => RowValues::Text(s),
            other => RowValues::JSON(other),
        }
    }
}

macro_rules! row_values_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::Int(i64::from(value))
                }
            }
        )*
    };
}

row_values_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// The kind of JOIN applied by `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum JoinType {
    /// Records that have matching values in both tables.
    #[default]
    Inner,
    /// All records from the left table, and the matched records from the right table.
    Left,
    /// All records from the right table, and the matched records from the left table.
    Right,
    /// All records when there is a match in either left or right table.
    FullOuter,
}

impl JoinType {
    /// Keyword placed before `JOIN`.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::FullOuter => "FULL OUTER",
        }
    }
}

/// Semantic SQL type of a stored-procedure output parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    String,
    StringFixedLength,
    Binary,
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    Currency,
    Date,
    Time,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Guid,
    Xml,
}

const MAX_BYTE_LENGTH: i32 = 8000;
const MAX_UNICODE_LENGTH: i32 = 4000;

impl DbType {
    /// T-SQL type used to `DECLARE` a variable of this type.
    ///
    /// Character and binary types use `size`, or `MAX` when it is absent, not positive, or
    /// past the type's limit (8000 bytes, 4000 for the N-types). A fixed-length type past its
    /// limit becomes the matching `(MAX)` variable-length type. Decimals use
    /// `precision`/`scale`, falling back to the server defaults (18, 0).
    #[must_use]
    pub fn sql_declaration(
        self,
        size: Option<i32>,
        precision: Option<u8>,
        scale: Option<u8>,
    ) -> String {
        let size = size.filter(|n| *n > 0);
        let variable = |name: &str, limit: i32| match size {
            Some(n) if n <= limit => format!("{name}({n})"),
            _ => format!("{name}(MAX)"),
        };
        let fixed = |name: &str, overflow: &str, limit: i32| match size {
            Some(n) if n > limit => format!("{overflow}(MAX)"),
            n => format!("{name}({})", n.unwrap_or(1)),
        };
        match self {
            DbType::AnsiString => variable("VARCHAR", MAX_BYTE_LENGTH),
            DbType::AnsiStringFixedLength => fixed("CHAR", "VARCHAR", MAX_BYTE_LENGTH),
            DbType::String => variable("NVARCHAR", MAX_UNICODE_LENGTH),
            DbType::StringFixedLength => fixed("NCHAR", "NVARCHAR", MAX_UNICODE_LENGTH),
            DbType::Binary => variable("VARBINARY", MAX_BYTE_LENGTH),
            DbType::Boolean => "BIT".to_string(),
            DbType::Byte => "TINYINT".to_string(),
            DbType::Int16 => "SMALLINT".to_string(),
            DbType::Int32 => "INT".to_string(),
            DbType::Int64 => "BIGINT".to_string(),
            DbType::Single => "REAL".to_string(),
            DbType::Double => "FLOAT".to_string(),
            DbType::Decimal => format!(
                "DECIMAL({}, {})",
                precision.unwrap_or(18),
                scale.unwrap_or(0)
            ),
            DbType::Currency => "MONEY".to_string(),
            DbType::Date => "DATE".to_string(),
            DbType::Time => "TIME".to_string(),
            DbType::DateTime => "DATETIME".to_string(),
            DbType::DateTime2 => "DATETIME2".to_string(),
            DbType::DateTimeOffset => "DATETIMEOFFSET".to_string(),
            DbType::Guid => "UNIQUEIDENTIFIER".to_string(),
            DbType::Xml => "XML".to_string(),
        }
    }
}
