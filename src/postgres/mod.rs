// PostgreSQL backend built on tokio-postgres.
//
// - config: tokio-postgres configuration from `ConnectOptions`
// - client: connection setup and the installed driver
// - params: `ToSql` for `RowValues`
// - query: result materialization and native routine calls
// - executor: the `NativeConnection` implementation
// - error: transport-failure classification

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod params;
pub mod query;

pub use client::{TOKIO_POSTGRES_DRIVER_NAME, TokioPostgresDriver, create_postgres_client};
pub use error::is_operational;
pub use executor::PostgresConnection;
pub use params::Params;
pub use query::{build_result_set, build_result_set_from_rows};
