//! INSERT and UPDATE payloads.

use super::Statement;
use super::states::{Insert, InsertValues, Update, UpdateSet};
use crate::error::FluentSqlError;
use crate::params::{Parameters, strip_marker};

impl<'s> Statement<'s, Insert> {
    /// ` (c1, c2)  VALUES (@c1, @c2)`, binding each value under its column's placeholder.
    ///
    /// Keys may be given with or without the leading `@`.
    ///
    /// # Errors
    /// `FluentSqlError::ArgumentError` if `values` is empty; nothing is appended in that case.
    pub fn values(
        mut self,
        values: impl Into<Parameters>,
    ) -> Result<Statement<'s, InsertValues>, FluentSqlError> {
        let values = non_empty(values.into(), "values")?;
        let columns = values.names().map(strip_marker).collect::<Vec<_>>().join(", ");
        let placeholders = values.names().collect::<Vec<_>>().join(", ");

        self.push(&format!(" ({columns}) "));
        self.push(&format!(" VALUES ({placeholders})"));
        self.bind_all(values)?;
        Ok(self.advance())
    }
}

impl<'s> Statement<'s, Update> {
    /// ` SET c1 = @c1, c2 = @c2`, binding each value under its column's placeholder.
    ///
    /// # Errors
    /// `FluentSqlError::ArgumentError` if `values` is empty.
    pub fn set(
        mut self,
        values: impl Into<Parameters>,
    ) -> Result<Statement<'s, UpdateSet>, FluentSqlError> {
        let values = non_empty(values.into(), "set")?;
        let assignments = values
            .names()
            .map(|name| format!("{} = {name}", strip_marker(name)))
            .collect::<Vec<_>>()
            .join(", ");

        self.push(&format!(" SET {assignments}"));
        self.bind_all(values)?;
        Ok(self.advance())
    }
}

fn non_empty(values: Parameters, clause: &str) -> Result<Parameters, FluentSqlError> {
    if values.is_empty() {
        Err(FluentSqlError::ArgumentError(format!(
            "{clause} requires at least one column"
        )))
    } else {
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::tests::session;
    use crate::params::Parameters;
    use crate::types::RowValues;

    #[test]
    fn insert_values_lists_columns_then_placeholders() {
        let mut sql = session();
        let stmt = sql
            .insert_into("Users")
            .values([("name", RowValues::from("Ada")), ("@age", RowValues::from(36))])
            .unwrap();
        assert_eq!(
            stmt.query(),
            "INSERT INTO Users (name, age)  VALUES (@name, @age)"
        );
        assert_eq!(stmt.parameters().get("@name"), Some(&RowValues::Text("Ada".into())));
        assert_eq!(stmt.parameters().get("age"), Some(&RowValues::Int(36)));
    }

    #[test]
    fn update_set_then_where() {
        let mut sql = session();
        let stmt = sql
            .update("Users")
            .set([("name", "Grace")])
            .unwrap()
            .where_with("id = @id", [("id", 7)])
            .unwrap();
        assert_eq!(stmt.query(), "UPDATE Users SET name = @name WHERE id = @id");
        assert_eq!(stmt.parameters().len(), 2);
    }

    #[test]
    fn empty_payloads_are_argument_errors() {
        let mut sql = session();
        let err = sql.insert_into("Users").values(Parameters::new()).unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!(sql.query(), Some("INSERT INTO Users"));

        let err = sql.update("Users").set(()).unwrap_err();
        assert!(err.is_argument_error());
        assert!(sql.parameters().is_empty());
    }

    #[test]
    fn delete_with_and_without_where() {
        let mut sql = session();
        assert_eq!(sql.delete_from("Logs").query(), "DELETE FROM Logs");
        let stmt = sql.delete_from("Logs").where_clause("CreatedAt < GETDATE() - 30");
        assert_eq!(stmt.query(), "DELETE FROM Logs WHERE CreatedAt < GETDATE() - 30");
    }
}
