use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlFacadeError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl SqlFacadeError {
    /// Whether this error means the connection itself is unusable.
    ///
    /// Operational failures make the executor re-establish the connection
    /// instead of rolling back; everything else is treated as a statement
    /// failure on a healthy connection.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            SqlFacadeError::PostgresError(e) => crate::postgres::is_operational(e),
            #[cfg(feature = "mssql")]
            SqlFacadeError::MssqlError(e) => crate::mssql::is_operational(e),
            SqlFacadeError::Io(_) => true,
            _ => false,
        }
    }
}
