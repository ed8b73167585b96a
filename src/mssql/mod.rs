// SQL Server backend built on tiberius.
//
// - config: tiberius configuration from `ConnectOptions`
// - client: TCP + TDS connection setup and the installed driver
// - params: binding `RowValues` onto tiberius queries
// - query: result materialization
// - executor: the `NativeConnection` implementation
// - error: transport-failure classification

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod params;
pub mod query;

pub use client::{MssqlClient, TIBERIUS_DRIVER_NAME, TiberiusDriver, create_mssql_client};
pub use error::is_operational;
pub use executor::MssqlConnection;
pub use params::bind_query_params;
pub use query::build_result_set;
