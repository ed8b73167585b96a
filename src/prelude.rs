//! Convenient imports for common functionality.

pub use crate::any::AnyDatabase;
pub use crate::backend::{Backend, Mssql, Postgres};
pub use crate::config::ConnectOptions;
pub use crate::error::SqlFacadeError;
pub use crate::executor::{CallState, Database, SqlExecutor};
pub use crate::results::{DbRow, Rows};
pub use crate::types::{DatabaseType, NamedArgs, RowValues};
pub use crate::{MssqlDatabase, PostgresDatabase, named_args, params};
