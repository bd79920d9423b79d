mod common;

use common::{Event, Recorder, rows};
use fluent_sql::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Count {
    total: i64,
}

fn totals() -> ResultSet {
    rows(&["total"], vec![vec![RowValues::Int(3)], vec![RowValues::Int(9)]])
}

#[tokio::test]
async fn custom_queries_pass_text_and_parameters_through() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.result_set = totals());
    let mut sql = recorder.session();

    let all = sql
        .execute_custom_query(
            "SELECT COUNT(*) AS total FROM Orders WHERE CustomerId = @customer",
            [("customer", 17)],
        )
        .await?;
    assert_eq!(all.len(), 2);

    let commands = recorder.commands();
    let cmd = &commands[0];
    assert_eq!(cmd.kind, CommandKind::Text);
    assert_eq!(
        cmd.text,
        "SELECT COUNT(*) AS total FROM Orders WHERE CustomerId = @customer"
    );
    assert_eq!(cmd.params, vec![("@customer".to_string(), RowValues::Int(17))]);

    let first = sql.execute_custom_query_single("SELECT 1", ()).await?;
    assert_eq!(first.and_then(|r| r.get("total").cloned()), Some(RowValues::Int(3)));
    assert!(recorder.commands()[1].params.is_empty());
    Ok(())
}

#[tokio::test]
async fn custom_queries_map_rows() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.result_set = totals());
    let mut sql = recorder.session();

    let counts: Vec<Count> = sql
        .execute_custom_query_mapped("SELECT total FROM Totals", ())
        .await?;
    assert_eq!(counts.iter().map(|c| c.total).sum::<i64>(), 12);

    let one: Option<Count> = sql
        .execute_custom_query_mapped_single(
            "SELECT total FROM Totals WHERE Id = @id",
            Parameters::new().with("id", 1),
        )
        .await?;
    assert_eq!(one.map(|c| c.total), Some(3));

    recorder.script(|s| s.result_set = ResultSet::default());
    let none: Option<Count> = sql
        .execute_custom_query_mapped_single("SELECT total FROM Totals WHERE 1 = 0", ())
        .await?;
    assert!(none.is_none());
    Ok(())
}

#[tokio::test]
async fn custom_non_query_returns_the_affected_count() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.rows_affected = 8);
    let mut sql = recorder.session();

    let affected = sql
        .execute_custom_non_query(
            "UPDATE Orders SET Status = @status WHERE Status = 'new'",
            vec![("status", "queued")],
        )
        .await?;
    assert_eq!(affected, 8);
    assert!(matches!(recorder.events()[2], Event::Execute(1, _)));
    assert_eq!(recorder.events()[3], Event::Close(1));
    Ok(())
}

#[tokio::test]
async fn custom_queries_leave_the_built_statement_alone() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.select(["Id"])
        .from("Users")
        .where_with("Id = @id", [("id", 5)])?;
    sql.execute_custom_non_query("DELETE FROM Cache", ()).await?;

    assert_eq!(sql.query(), Some("SELECT Id FROM Users WHERE Id = @id"));
    assert_eq!(sql.parameters().get("id"), Some(&RowValues::Int(5)));
    Ok(())
}

#[tokio::test]
async fn session_timeout_travels_with_every_command() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();
    sql.set_timeout(12);

    sql.execute_custom_non_query("SELECT 1", ()).await?;
    sql.delete_from("T").execute().await?;
    sql.store_procedure("dbo.P").execute_non_query().await?;

    assert!(recorder.commands().iter().all(|cmd| cmd.timeout == Some(12)));
    Ok(())
}
