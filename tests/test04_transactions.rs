mod common;

use common::{Event, Recorder};
use fluent_sql::prelude::*;
use tokio::task::yield_now;

async fn add_user(sql: &mut FluentSql, name: &str) -> Result<usize, FluentSqlError> {
    sql.insert_into("Users")
        .values([("name", name)])?
        .execute()
        .await
}

#[tokio::test]
async fn statements_share_the_transaction_connection() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.rows_affected = 1);
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    assert!(sql.in_transaction());
    add_user(&mut sql, "Ann").await?;
    add_user(&mut sql, "Bob").await?;
    sql.commit_transaction().await?;
    assert!(!sql.in_transaction());

    let events = recorder.events();
    assert_eq!(events.len(), 7);
    assert_eq!(&events[..3], &[Event::Connect(1), Event::Open(1), Event::Begin(1)]);
    assert!(matches!(events[3], Event::Execute(1, _)));
    assert!(matches!(events[4], Event::Execute(1, _)));
    assert_eq!(&events[5..], &[Event::Commit(1), Event::Close(1)]);
    Ok(())
}

#[tokio::test]
async fn failed_commit_rolls_back_before_reporting() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.fail_commit = true);
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    add_user(&mut sql, "Ann").await?;
    let err = sql.commit_transaction().await.unwrap_err();
    assert!(matches!(err, FluentSqlError::ExecutionError(ref msg) if msg == "commit refused"));
    assert!(!sql.in_transaction());

    let events = recorder.events();
    let tail = &events[events.len() - 3..];
    assert_eq!(tail, &[Event::Commit(1), Event::Rollback(1), Event::Close(1)]);

    // The session is usable again and goes back to one connection per statement.
    recorder.script(|s| s.fail_commit = false);
    recorder.clear_events();
    add_user(&mut sql, "Bob").await?;
    assert_eq!(recorder.events()[0], Event::Connect(2));
    Ok(())
}

#[tokio::test]
async fn rollback_releases_the_connection() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    sql.update("Users")
        .set([("active", false)])?
        .execute()
        .await?;
    sql.rollback_transaction().await?;

    assert!(!sql.in_transaction());
    let events = recorder.events();
    assert_eq!(&events[events.len() - 2..], &[Event::Rollback(1), Event::Close(1)]);
    assert_eq!(recorder.count(|e| matches!(e, Event::Commit(_))), 0);
    Ok(())
}

#[tokio::test]
async fn begin_is_idempotent_and_commit_without_begin_is_a_noop() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.commit_transaction().await?;
    sql.rollback_transaction().await?;
    assert!(recorder.events().is_empty());

    sql.begin_transaction().await?;
    sql.begin_transaction().await?;
    assert_eq!(recorder.count(|e| matches!(e, Event::Begin(_))), 1);
    assert_eq!(recorder.count(|e| matches!(e, Event::Connect(_))), 1);
    sql.commit_transaction().await?;
    Ok(())
}

#[tokio::test]
async fn failed_statements_keep_the_transaction_open() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    recorder.script(|s| s.fail_commands = true);
    assert!(add_user(&mut sql, "Ann").await.is_err());
    assert!(sql.in_transaction());
    assert_eq!(recorder.count(|e| matches!(e, Event::Close(_))), 0);

    sql.rollback_transaction().await?;
    assert_eq!(recorder.events().last(), Some(&Event::Close(1)));
    Ok(())
}

#[tokio::test]
async fn custom_and_built_statements_join_the_transaction() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    sql.execute_custom_non_query("SET NOCOUNT ON", ()).await?;
    let _ = sql.select_all().from("Users").to_dynamic().await?;
    let _ = sql
        .store_procedure("dbo.Touch")
        .execute_non_query()
        .await?;
    sql.commit_transaction().await?;

    assert_eq!(recorder.count(|e| matches!(e, Event::Connect(_))), 1);
    assert_eq!(
        recorder.count(|e| matches!(e, Event::Execute(1, _) | Event::Query(1, _))),
        3
    );
    Ok(())
}

#[tokio::test]
async fn dispose_rolls_back_an_open_transaction() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    add_user(&mut sql, "Ann").await?;
    sql.dispose().await?;

    let events = recorder.events();
    assert_eq!(&events[events.len() - 2..], &[Event::Rollback(1), Event::Close(1)]);
    Ok(())
}

#[tokio::test]
async fn dispose_reports_a_failed_rollback() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    recorder.script(|s| s.fail_rollback = true);
    let mut sql = recorder.session();

    sql.begin_transaction().await?;
    let err = sql.dispose().await.unwrap_err();
    assert!(matches!(err, FluentSqlError::ExecutionError(_)));
    assert_eq!(recorder.events().last(), Some(&Event::Close(1)));
    Ok(())
}

#[tokio::test]
async fn dropping_a_session_rolls_back_in_the_background() -> Result<(), FluentSqlError> {
    let recorder = Recorder::new();
    {
        let mut sql = recorder.session();
        sql.begin_transaction().await?;
        add_user(&mut sql, "Ann").await?;
    }

    for _ in 0..10 {
        if recorder.events().last() == Some(&Event::Close(1)) {
            break;
        }
        yield_now().await;
    }

    let events = recorder.events();
    assert_eq!(&events[events.len() - 2..], &[Event::Rollback(1), Event::Close(1)]);
    assert_eq!(recorder.count(|e| matches!(e, Event::Commit(_))), 0);
    Ok(())
}

#[tokio::test]
async fn dropping_an_idle_session_does_nothing() {
    let recorder = Recorder::new();
    {
        let mut sql = recorder.session();
        let _ = sql.select_all().from("Users");
    }
    yield_now().await;
    assert!(recorder.events().is_empty());
}
