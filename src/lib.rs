//! A blocking, backend-uniform facade over SQL Server (tiberius) and
//! `PostgreSQL` (tokio-postgres).
//!
//! Every handle exposes the same four operations through [`SqlExecutor`]:
//! `perform`, `select`, `procedure` and `function`. A handle owns exactly one
//! connection. Statement failures roll the transaction back; transport
//! failures re-establish the connection. Either way the original error is
//! returned and nothing is retried.

#[macro_use]
mod macros;

pub mod any;
pub mod backend;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod results;
pub mod synthesis;
pub mod translation;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use any::AnyDatabase;
pub use backend::{Backend, CallStyle, Mssql, Postgres};
pub use config::{ConnectOptions, ConnectOptionsBuilder};
pub use driver::{Driver, DriverRegistry, DriverSelection, NativeConnection};
pub use error::SqlFacadeError;
pub use executor::{CallState, Database, SqlExecutor};
pub use results::{DbRow, ResultSet, Rows};
pub use types::{DatabaseType, NamedArgs, RowValues};

/// Handle to SQL Server.
pub type MssqlDatabase = Database<Mssql>;
/// Handle to `PostgreSQL`.
pub type PostgresDatabase = Database<Postgres>;
