use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::trace;

use crate::error::FluentSqlError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Open a TCP connection and log in.
///
/// Named instances (`host\instance`) are resolved through the SQL Browser service.
///
/// # Errors
/// Returns `FluentSqlError::ConnectionError` if the TCP connect or the login fails.
pub(crate) async fn connect_client(config: Config) -> Result<MssqlClient, FluentSqlError> {
    trace!(addr = %config.get_addr(), "connecting to SQL Server");

    let tcp = TcpStream::connect_named(&config).await.map_err(|e| {
        FluentSqlError::ConnectionError(format!(
            "TCP connection to {} failed: {e}",
            config.get_addr()
        ))
    })?;
    tcp.set_nodelay(true)?;

    Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| FluentSqlError::ConnectionError(format!("SQL Server login failed: {e}")))
}
