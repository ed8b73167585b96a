use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ConnectOptions;
use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::types::{NamedArgs, RowValues};

/// One live connection owned by a [`Database`](crate::Database).
///
/// A transaction is implicitly open while statements run; `commit` and
/// `rollback` end it. Statements use `?` placeholders; implementations
/// translate them to their native form.
#[async_trait]
pub trait NativeConnection: Send {
    /// Run a statement for effect and return the affected-row count.
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlFacadeError>;

    /// Run a statement and fetch every row it produces.
    async fn query(&mut self, sql: &str, params: &[RowValues])
    -> Result<ResultSet, SqlFacadeError>;

    /// Invoke a stored routine with named arguments through the driver's
    /// own call primitive.
    async fn call_routine(
        &mut self,
        name: &str,
        _args: &NamedArgs,
    ) -> Result<ResultSet, SqlFacadeError> {
        Err(SqlFacadeError::Unimplemented(format!(
            "native routine call for {name}"
        )))
    }

    async fn commit(&mut self) -> Result<(), SqlFacadeError>;

    async fn rollback(&mut self) -> Result<(), SqlFacadeError>;
}

/// An installed transport that can open [`NativeConnection`]s.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Name the driver reports when enumerated.
    fn name(&self) -> &str;

    /// Open a connection. `port` is already resolved against the backend default.
    async fn connect(
        &self,
        options: &ConnectOptions,
        port: u16,
    ) -> Result<Box<dyn NativeConnection>, SqlFacadeError>;
}

/// How the connection manager picks a driver out of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSelection {
    /// First driver whose name contains the needle.
    NameContains(&'static str),
    /// The first installed driver, no enumeration.
    Direct,
}

/// The drivers installed for one backend.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn Driver>>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_driver(mut self, driver: impl Driver + 'static) -> Self {
        self.register(driver);
        self
    }

    pub fn register(&mut self, driver: impl Driver + 'static) {
        self.drivers.push(Arc::new(driver));
    }

    /// Names of the installed drivers, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.name()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError("driver not found")` when nothing matches.
    pub fn select(&self, selection: DriverSelection) -> Result<Arc<dyn Driver>, SqlFacadeError> {
        let found = match selection {
            DriverSelection::NameContains(needle) => {
                self.drivers.iter().find(|d| d.name().contains(needle))
            }
            DriverSelection::Direct => self.drivers.first(),
        };
        found
            .cloned()
            .ok_or_else(|| SqlFacadeError::ConnectionError("driver not found".to_string()))
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
