//! Session-level transactions and disposal.
//!
//! A T-SQL transaction lives on its connection, so the session keeps that connection
//! for as long as the transaction runs and every statement executes on it. Commit and
//! rollback always give the connection back, even when they fail.

use tracing::{debug, warn};

use super::FluentSql;
use crate::error::FluentSqlError;
use crate::executor::{ConnectionState, DbConnection};

impl FluentSql {
    /// Begin a transaction, connecting and opening as needed.
    ///
    /// Calling this while a transaction is already active does nothing.
    ///
    /// # Errors
    /// Connection and `BEGIN` failures; the connection is released before returning.
    pub async fn begin_transaction(&mut self) -> Result<(), FluentSqlError> {
        if self.in_transaction {
            return Ok(());
        }
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => self.connector.connect(&self.connection_string).await?,
        };
        let conn = self.connection.insert(conn);

        let begun = async {
            if conn.state() == ConnectionState::Closed {
                conn.open().await?;
            }
            conn.begin_transaction().await
        }
        .await;

        match begun {
            Ok(()) => {
                debug!("transaction started");
                self.in_transaction = true;
                Ok(())
            }
            Err(err) => {
                if let Some(conn) = self.connection.take() {
                    release(conn).await;
                }
                Err(err)
            }
        }
    }

    /// Commit the active transaction.
    ///
    /// When the commit fails a rollback is attempted before the commit error is returned.
    /// Either way the connection is released and the session leaves transaction mode.
    ///
    /// # Errors
    /// The commit error, unchanged.
    pub async fn commit_transaction(&mut self) -> Result<(), FluentSqlError> {
        let was_active = std::mem::take(&mut self.in_transaction);
        let Some(mut conn) = self.connection.take() else {
            return Ok(());
        };

        let result = if was_active { conn.commit().await } else { Ok(()) };
        match &result {
            Ok(()) => debug!("transaction committed"),
            Err(err) => {
                warn!("commit failed, rolling back: {err}");
                if let Err(rollback_err) = conn.rollback().await {
                    warn!("rollback after failed commit also failed: {rollback_err}");
                }
            }
        }
        release(conn).await;
        result
    }

    /// Roll back the active transaction and release the connection.
    ///
    /// # Errors
    /// The rollback error; the connection is released regardless.
    pub async fn rollback_transaction(&mut self) -> Result<(), FluentSqlError> {
        let was_active = std::mem::take(&mut self.in_transaction);
        let Some(mut conn) = self.connection.take() else {
            return Ok(());
        };

        let result = if was_active { conn.rollback().await } else { Ok(()) };
        if result.is_ok() {
            debug!("transaction rolled back");
        }
        release(conn).await;
        result
    }

    /// Release the session, rolling back a transaction that is still active.
    ///
    /// Dropping a session does the same on a spawned task; `dispose` lets the caller wait
    /// for it and see a rollback failure.
    ///
    /// # Errors
    /// The rollback error, if one was needed and failed.
    pub async fn dispose(mut self) -> Result<(), FluentSqlError> {
        self.rollback_transaction().await
    }
}

/// Close `conn`, logging instead of failing; the caller already has the outcome it reports.
async fn release(mut conn: Box<dyn DbConnection>) {
    if let Err(err) = conn.close().await {
        warn!("failed to close connection: {err}");
    }
}
