use std::sync::Arc;

use tracing::debug;

use crate::config::ConnectOptions;
use crate::driver::{Driver, DriverRegistry, DriverSelection, NativeConnection};
use crate::error::SqlFacadeError;

/// Owns the single live connection of a handle and knows how to re-establish it.
pub struct ConnectionManager {
    options: ConnectOptions,
    port: u16,
    registry: DriverRegistry,
    selection: DriverSelection,
    conn: Box<dyn NativeConnection>,
    generation: u64,
}

impl ConnectionManager {
    /// Select a driver and open the first connection.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if no driver matches or the
    /// transport rejects the address or credentials.
    pub async fn connect(
        options: ConnectOptions,
        port: u16,
        registry: DriverRegistry,
        selection: DriverSelection,
    ) -> Result<Self, SqlFacadeError> {
        let conn = establish(&options, port, &registry, selection).await?;
        Ok(Self {
            options,
            port,
            registry,
            selection,
            conn,
            generation: 1,
        })
    }

    /// Replace the native connection with a freshly established one.
    ///
    /// The old connection is only dropped once the new one is up; on failure
    /// it stays in place.
    ///
    /// # Errors
    /// Same as [`ConnectionManager::connect`].
    pub async fn reconnect(&mut self) -> Result<(), SqlFacadeError> {
        let conn = establish(&self.options, self.port, &self.registry, self.selection).await?;
        self.conn = conn;
        self.generation += 1;
        debug!(generation = self.generation, "connection replaced");
        Ok(())
    }

    pub fn connection_mut(&mut self) -> &mut dyn NativeConnection {
        self.conn.as_mut()
    }

    /// Incremented every time a native connection is established.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }
}

async fn establish(
    options: &ConnectOptions,
    port: u16,
    registry: &DriverRegistry,
    selection: DriverSelection,
) -> Result<Box<dyn NativeConnection>, SqlFacadeError> {
    let driver: Arc<dyn Driver> = registry.select(selection)?;
    debug!(
        driver = driver.name(),
        host = %options.host,
        port,
        database = %options.database,
        "connecting"
    );
    driver.connect(options, port).await
}
