use async_trait::async_trait;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use super::config::build_tiberius_config;
use super::executor::MssqlConnection;
use crate::config::ConnectOptions;
use crate::driver::{Driver, NativeConnection};
use crate::error::SqlFacadeError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Name the tiberius driver reports when the registry is enumerated.
pub const TIBERIUS_DRIVER_NAME: &str = "Tiberius TDS driver for SQL Server";

/// Open a TDS connection to SQL Server.
///
/// Follows one server-issued routing redirect (Azure SQL gateways).
///
/// # Errors
/// Returns `SqlFacadeError::ConnectionError` if the TCP connection or the TDS
/// login fails.
pub async fn create_mssql_client(
    opts: &ConnectOptions,
    port: u16,
) -> Result<MssqlClient, SqlFacadeError> {
    let mut config = build_tiberius_config(opts, port);

    let client = match Client::connect(config.clone(), open_tcp(&config.get_addr()).await?).await {
        Ok(client) => client,
        Err(tiberius::error::Error::Routing { host, port }) => {
            debug!(%host, port, "following SQL Server routing redirect");
            config.host(&host);
            config.port(port);
            Client::connect(config.clone(), open_tcp(&config.get_addr()).await?)
                .await
                .map_err(|e| {
                    SqlFacadeError::ConnectionError(format!("SQL Server connection error: {e}"))
                })?
        }
        Err(e) => {
            return Err(SqlFacadeError::ConnectionError(format!(
                "SQL Server connection error: {e}"
            )));
        }
    };

    Ok(client)
}

async fn open_tcp(addr: &str) -> Result<Compat<TcpStream>, SqlFacadeError> {
    let tcp = TcpStream::connect(addr)
        .await
        .map_err(|e| SqlFacadeError::ConnectionError(format!("TCP connection error: {e}")))?;
    tcp.set_nodelay(true)
        .map_err(|e| SqlFacadeError::ConnectionError(format!("TCP connection error: {e}")))?;
    Ok(tcp.compat_write())
}

/// The SQL Server transport compiled in with the `mssql` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiberiusDriver;

#[async_trait]
impl Driver for TiberiusDriver {
    fn name(&self) -> &str {
        TIBERIUS_DRIVER_NAME
    }

    async fn connect(
        &self,
        options: &ConnectOptions,
        port: u16,
    ) -> Result<Box<dyn NativeConnection>, SqlFacadeError> {
        let client = create_mssql_client(options, port).await?;
        let conn = MssqlConnection::open(client).await?;
        Ok(Box::new(conn))
    }
}
