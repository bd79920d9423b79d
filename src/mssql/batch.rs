//! T-SQL text for stored-procedure calls.
//!
//! tiberius has no RPC parameter directions, so output parameters become local variables
//! of a small batch: declared with their SQL type and a NULL initial value, passed with
//! `OUTPUT`, then selected back as the batch's last result set.

use std::fmt::Write as _;

use crate::params::{Parameters, normalize_name, strip_marker};
use crate::procedure::OutputParameter;

/// Column carrying `@@ROWCOUNT` in the read-back row of a non-query call.
pub(crate) const ROW_COUNT_COLUMN: &str = "__rowcount";

/// `EXEC name @a = @P1, @b = @P2, @out = @out OUTPUT`
pub(crate) fn exec_statement(
    name: &str,
    params: &Parameters,
    outputs: &[OutputParameter],
) -> String {
    let mut sql = format!("EXEC {name}");
    let mut separator = " ";
    for (position, param) in params.names().enumerate() {
        let _ = write!(sql, "{separator}{param} = @P{}", position + 1);
        separator = ", ";
    }
    for output in outputs {
        let variable = normalize_name(output.name());
        let _ = write!(sql, "{separator}{variable} = {variable} OUTPUT");
        separator = ", ";
    }
    sql
}

/// Batch declaring every output, calling the procedure and selecting the outputs back.
///
/// With `capture_row_count` the read-back row starts with the procedure's `@@ROWCOUNT`
/// under [`ROW_COUNT_COLUMN`].
pub(crate) fn output_batch(
    name: &str,
    params: &Parameters,
    outputs: &[OutputParameter],
    capture_row_count: bool,
) -> String {
    let mut sql = String::new();
    for output in outputs {
        let _ = writeln!(
            sql,
            "DECLARE {} {} = NULL;",
            normalize_name(output.name()),
            output.sql_declaration()
        );
    }
    let _ = writeln!(sql, "{};", exec_statement(name, params, outputs));

    let mut columns = Vec::with_capacity(outputs.len() + 1);
    if capture_row_count {
        columns.push(format!("@@ROWCOUNT AS {}", quote_identifier(ROW_COUNT_COLUMN)));
    }
    columns.extend(outputs.iter().map(|output| {
        format!(
            "{} AS {}",
            normalize_name(output.name()),
            quote_identifier(strip_marker(output.name()))
        )
    }));
    let _ = write!(sql, "SELECT {};", columns.join(", "));
    sql
}

/// `[name]`, with `]` escaped.
fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbType;

    #[test]
    fn exec_binds_inputs_positionally() {
        let params = Parameters::new().with("region", "EU").with("@year", 2024);
        assert_eq!(
            exec_statement("dbo.Report", &params, &[]),
            "EXEC dbo.Report @region = @P1, @year = @P2"
        );
        assert_eq!(
            exec_statement("dbo.Ping", &Parameters::new(), &[]),
            "EXEC dbo.Ping"
        );
    }

    #[test]
    fn output_batch_declares_and_reads_back() {
        let params = Parameters::new().with("name", "Ada");
        let outputs = [
            OutputParameter::new("id", DbType::Int32),
            OutputParameter::with_size("@message", DbType::String, 50),
        ];
        assert_eq!(
            output_batch("dbo.CreateUser", &params, &outputs, true),
            "DECLARE @id INT = NULL;\n\
             DECLARE @message NVARCHAR(50) = NULL;\n\
             EXEC dbo.CreateUser @name = @P1, @id = @id OUTPUT, @message = @message OUTPUT;\n\
             SELECT @@ROWCOUNT AS [__rowcount], @id AS [id], @message AS [message];"
        );
    }

    #[test]
    fn query_batch_skips_row_count() {
        let outputs = [OutputParameter::new("total", DbType::Int64)];
        let sql = output_batch("dbo.Totals", &Parameters::new(), &outputs, false);
        assert!(sql.ends_with("SELECT @total AS [total];"));
        assert!(sql.contains("EXEC dbo.Totals @total = @total OUTPUT;"));
    }
}
