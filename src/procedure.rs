//! Stored-procedure value objects.

use std::collections::HashMap;

use crate::params::{Parameters, strip_marker};
use crate::types::{DbType, RowValues};

/// An output parameter of a stored procedure.
///
/// The name is stored without its leading `@`; it is added back when the parameter is
/// declared for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputParameter {
    name: String,
    db_type: DbType,
    size: Option<i32>,
    precision: Option<u8>,
    scale: Option<u8>,
}

impl OutputParameter {
    #[must_use]
    pub fn new(name: &str, db_type: DbType) -> Self {
        Self::with_details(name, db_type, None, None, None)
    }

    /// Output parameter with a size, required for the string and binary types.
    #[must_use]
    pub fn with_size(name: &str, db_type: DbType, size: i32) -> Self {
        Self::with_details(name, db_type, Some(size), None, None)
    }

    /// Output parameter with precision and scale, for decimal types.
    #[must_use]
    pub fn with_precision(name: &str, db_type: DbType, precision: u8, scale: u8) -> Self {
        Self::with_details(name, db_type, None, Some(precision), Some(scale))
    }

    #[must_use]
    pub fn with_details(
        name: &str,
        db_type: DbType,
        size: Option<i32>,
        precision: Option<u8>,
        scale: Option<u8>,
    ) -> Self {
        Self {
            name: strip_marker(name).to_string(),
            db_type,
            size,
            precision,
            scale,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    #[must_use]
    pub fn size(&self) -> Option<i32> {
        self.size
    }

    #[must_use]
    pub fn precision(&self) -> Option<u8> {
        self.precision
    }

    #[must_use]
    pub fn scale(&self) -> Option<u8> {
        self.scale
    }

    /// T-SQL type declaration for this parameter.
    #[must_use]
    pub fn sql_declaration(&self) -> String {
        self.db_type
            .sql_declaration(self.size, self.precision, self.scale)
    }
}

/// The result of a stored-procedure execution that declared output parameters.
#[derive(Debug, Clone)]
pub struct StoredProcedureWithOutputResult<T> {
    return_value: T,
    output_parameters: HashMap<String, RowValues>,
}

impl<T> StoredProcedureWithOutputResult<T> {
    pub(crate) fn new(return_value: T, output_parameters: HashMap<String, RowValues>) -> Self {
        Self {
            return_value,
            output_parameters,
        }
    }

    /// The value the procedure call produced (affected rows, rows or mapped objects).
    pub fn return_value(&self) -> &T {
        &self.return_value
    }

    /// Output parameter values keyed by bare name.
    #[must_use]
    pub fn output_parameters(&self) -> &HashMap<String, RowValues> {
        &self.output_parameters
    }

    /// Value of one output parameter; accepts the name with or without `@`.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&RowValues> {
        self.output_parameters.get(strip_marker(name))
    }

    pub fn into_parts(self) -> (T, HashMap<String, RowValues>) {
        (self.return_value, self.output_parameters)
    }
}

/// Buffers of a stored-procedure call being built.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProcedureCall {
    pub(crate) name: String,
    pub(crate) parameters: Parameters,
    pub(crate) output_parameters: Vec<OutputParameter>,
}

impl ProcedureCall {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_stripped_from_output_names() {
        let p = OutputParameter::with_size("@message", DbType::String, 200);
        assert_eq!(p.name(), "message");
        assert_eq!(p.size(), Some(200));
        assert_eq!(p.sql_declaration(), "NVARCHAR(200)");

        let q = OutputParameter::with_precision("total", DbType::Decimal, 12, 4);
        assert_eq!(q.name(), "total");
        assert_eq!((q.precision(), q.scale()), (Some(12), Some(4)));
    }

    #[test]
    fn output_lookup_accepts_either_form() {
        let mut outputs = HashMap::new();
        outputs.insert("count".to_string(), RowValues::Int(3));
        let result = StoredProcedureWithOutputResult::new(1usize, outputs);
        assert_eq!(result.output("@count"), Some(&RowValues::Int(3)));
        assert_eq!(result.output("count"), Some(&RowValues::Int(3)));
        assert_eq!(*result.return_value(), 1);
    }
}
