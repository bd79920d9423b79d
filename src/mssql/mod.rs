// MSSQL module - the bundled SQL Server collaborator, built on tiberius
//
// This module is split into several sub-modules:
// - config: Connection options and connection-string parsing
// - client: Raw client creation
// - params: Parameter binding onto tiberius queries
// - query: Result extraction and execution helpers
// - batch: T-SQL text for stored-procedure calls with output parameters
// - connection: The `Connector` / `DbConnection` implementation

mod batch;
pub mod client;
pub mod config;
mod connection;
mod params;
mod query;

pub use client::MssqlClient;
pub use config::{MssqlOptions, MssqlOptionsBuilder};
pub use connection::{MssqlConnection, MssqlConnector};
