use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluentSqlError {
    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    MappingError(#[from] serde_json::Error),

    /// Programmer error raised before any I/O, e.g. an empty `values()` map.
    #[error("Argument error: {0}")]
    ArgumentError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Command timed out after {0} seconds")]
    Timeout(u32),

    #[error("Other database error: {0}")]
    Other(String),
}

impl FluentSqlError {
    /// True for usage errors that must never be retried.
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::ArgumentError(_))
    }
}
