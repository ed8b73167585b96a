use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::debug;

use super::config::build_postgres_config;
use super::executor::PostgresConnection;
use crate::config::ConnectOptions;
use crate::driver::{Driver, NativeConnection};
use crate::error::SqlFacadeError;

/// Name the tokio-postgres driver reports when the registry is enumerated.
pub const TOKIO_POSTGRES_DRIVER_NAME: &str = "tokio-postgres";

/// Open a `PostgreSQL` connection and spawn its I/O task on the current runtime.
///
/// The task ends when the returned client is dropped.
///
/// # Errors
/// Returns `SqlFacadeError::ConnectionError` if the server is unreachable or
/// rejects the credentials.
pub async fn create_postgres_client(
    opts: &ConnectOptions,
    port: u16,
) -> Result<Client, SqlFacadeError> {
    let config = build_postgres_config(opts, port);
    let (client, connection) = config.connect(NoTls).await.map_err(|e| {
        SqlFacadeError::ConnectionError(format!("Postgres connection error: {e}"))
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "postgres connection task ended");
        }
    });

    Ok(client)
}

/// The `PostgreSQL` transport compiled in with the `postgres` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPostgresDriver;

#[async_trait]
impl Driver for TokioPostgresDriver {
    fn name(&self) -> &str {
        TOKIO_POSTGRES_DRIVER_NAME
    }

    async fn connect(
        &self,
        options: &ConnectOptions,
        port: u16,
    ) -> Result<Box<dyn NativeConnection>, SqlFacadeError> {
        let client = create_postgres_client(options, port).await?;
        Ok(Box::new(PostgresConnection::new(client)))
    }
}
