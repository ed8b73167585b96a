use crate::backend::{Mssql, Postgres};
use crate::config::ConnectOptions;
use crate::error::SqlFacadeError;
use crate::executor::{CallState, Database, SqlExecutor};
use crate::results::Rows;
use crate::types::{DatabaseType, NamedArgs, RowValues};

/// A handle whose backend is chosen at configuration time.
///
/// ```rust,no_run
/// use sql_facade::prelude::*;
///
/// # fn main() -> Result<(), SqlFacadeError> {
/// let mut db = AnyDatabase::connect(
///     DatabaseType::Postgres,
///     ConnectOptions::new("app", "pw", "shop"),
/// )?;
/// let rows: Vec<_> = db.select("SELECT 1 AS x", &[])?.collect();
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub enum AnyDatabase {
    Mssql(Database<Mssql>),
    Postgres(Database<Postgres>),
}

impl AnyDatabase {
    /// # Errors
    /// See [`Database::connect`].
    pub fn connect(db_type: DatabaseType, options: ConnectOptions) -> Result<Self, SqlFacadeError> {
        match db_type {
            DatabaseType::Mssql => Database::<Mssql>::connect(options).map(AnyDatabase::Mssql),
            DatabaseType::Postgres => {
                Database::<Postgres>::connect(options).map(AnyDatabase::Postgres)
            }
        }
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            AnyDatabase::Mssql(db) => db.database_type(),
            AnyDatabase::Postgres(db) => db.database_type(),
        }
    }

    /// # Errors
    /// See [`Database::reconnect`].
    pub fn reconnect(&mut self) -> Result<(), SqlFacadeError> {
        match self {
            AnyDatabase::Mssql(db) => db.reconnect(),
            AnyDatabase::Postgres(db) => db.reconnect(),
        }
    }

    #[must_use]
    pub fn connection_generation(&self) -> u64 {
        match self {
            AnyDatabase::Mssql(db) => db.connection_generation(),
            AnyDatabase::Postgres(db) => db.connection_generation(),
        }
    }

    #[must_use]
    pub fn last_call_state(&self) -> CallState {
        match self {
            AnyDatabase::Mssql(db) => db.last_call_state(),
            AnyDatabase::Postgres(db) => db.last_call_state(),
        }
    }
}

impl From<Database<Mssql>> for AnyDatabase {
    fn from(db: Database<Mssql>) -> Self {
        AnyDatabase::Mssql(db)
    }
}

impl From<Database<Postgres>> for AnyDatabase {
    fn from(db: Database<Postgres>) -> Self {
        AnyDatabase::Postgres(db)
    }
}

impl SqlExecutor for AnyDatabase {
    fn perform(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, SqlFacadeError> {
        match self {
            AnyDatabase::Mssql(db) => db.perform(sql, params),
            AnyDatabase::Postgres(db) => db.perform(sql, params),
        }
    }

    fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Rows, SqlFacadeError> {
        match self {
            AnyDatabase::Mssql(db) => db.select(sql, params),
            AnyDatabase::Postgres(db) => db.select(sql, params),
        }
    }

    fn procedure(&mut self, name: &str, args: &NamedArgs) -> Result<usize, SqlFacadeError> {
        match self {
            AnyDatabase::Mssql(db) => db.procedure(name, args),
            AnyDatabase::Postgres(db) => db.procedure(name, args),
        }
    }

    fn function(&mut self, name: &str, args: &NamedArgs) -> Result<Rows, SqlFacadeError> {
        match self {
            AnyDatabase::Mssql(db) => db.function(name, args),
            AnyDatabase::Postgres(db) => db.function(name, args),
        }
    }
}
