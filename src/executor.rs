use std::marker::PhantomData;

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::backend::{Backend, CallStyle};
use crate::config::ConnectOptions;
use crate::connection::ConnectionManager;
use crate::driver::DriverRegistry;
use crate::error::SqlFacadeError;
use crate::results::{ResultSet, Rows};
use crate::synthesis::synthesize_call;
use crate::types::{DatabaseType, NamedArgs, RowValues};

/// The four operations every backend supports.
///
/// Statements use `?` placeholders. Errors from the backend come back
/// unchanged; before they do, the handle has either rolled back the current
/// transaction or, for transport failures, re-established its connection.
/// Nothing is retried.
pub trait SqlExecutor {
    /// Execute a statement, commit, and return the affected-row count.
    ///
    /// # Errors
    /// Returns the backend's error after rollback or reconnect.
    fn perform(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, SqlFacadeError>;

    /// Execute a query and return its rows. Does not commit.
    ///
    /// # Errors
    /// Returns the backend's error after rollback or reconnect.
    fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Rows, SqlFacadeError>;

    /// Call a stored procedure with named arguments, commit, and return a row count.
    ///
    /// # Errors
    /// `SqlFacadeError::ParameterError` for invalid routine/argument names,
    /// otherwise as [`SqlExecutor::perform`].
    fn procedure(&mut self, name: &str, args: &NamedArgs) -> Result<usize, SqlFacadeError>;

    /// Call a stored function with named arguments and return its rows.
    ///
    /// # Errors
    /// `SqlFacadeError::ParameterError` for invalid routine/argument names,
    /// otherwise as [`SqlExecutor::select`].
    fn function(&mut self, name: &str, args: &NamedArgs) -> Result<Rows, SqlFacadeError>;
}

/// Where the most recent call on a handle ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Executing,
    /// Read path finished; nothing committed.
    Fetched,
    Committed,
    /// The statement succeeded but the commit itself failed.
    CommitFailed,
    RolledBack,
    ReconnectedAndFailed,
}

enum Statement<'a> {
    Execute {
        sql: &'a str,
        params: &'a [RowValues],
    },
    Query {
        sql: &'a str,
        params: &'a [RowValues],
    },
    Call {
        name: &'a str,
        args: &'a NamedArgs,
    },
}

enum Outcome {
    RowCount(u64),
    Rows(ResultSet),
}

/// A blocking handle holding exactly one connection to one database.
///
/// ```rust,no_run
/// use sql_facade::prelude::*;
///
/// # fn main() -> Result<(), SqlFacadeError> {
/// let opts = ConnectOptions::new("sa", "secret", "shop");
/// let mut db = MssqlDatabase::connect(opts)?;
/// let updated = db.perform("UPDATE t SET v=? WHERE id=?", &params![5, 1])?;
/// for row in db.select("SELECT id, v FROM t", &[])? {
///     println!("{:?} {:?}", row.get("id"), row.get("v"));
/// }
/// db.procedure("add_user", &named_args! { "name" => "a", "age" => 3 })?;
/// # let _ = updated;
/// # Ok(())
/// # }
/// ```
///
/// Each handle drives its own single-threaded tokio runtime; do not call it
/// from inside another async runtime's worker (use `spawn_blocking`).
pub struct Database<B: Backend> {
    manager: ConnectionManager,
    runtime: Runtime,
    last_state: CallState,
    _backend: PhantomData<fn() -> B>,
}

impl<B: Backend> Database<B> {
    /// Connect using the drivers compiled into this build.
    ///
    /// # Errors
    /// `ValidationError` for an empty field or zero port, `ConfigError` when
    /// the backend is not installed, `ConnectionError` when no driver matches
    /// or the server refuses the connection.
    pub fn connect(options: ConnectOptions) -> Result<Self, SqlFacadeError> {
        Self::connect_with(options, B::installed_drivers())
    }

    /// Connect using an explicit set of drivers.
    ///
    /// # Errors
    /// See [`Database::connect`].
    pub fn connect_with(
        options: ConnectOptions,
        registry: DriverRegistry,
    ) -> Result<Self, SqlFacadeError> {
        options.validate()?;
        if registry.is_empty() {
            return Err(SqlFacadeError::ConfigError(
                "backend package is not installed".to_string(),
            ));
        }

        let runtime = Builder::new_current_thread().enable_all().build()?;
        let port = options.port_or(B::DATABASE_TYPE.default_port());
        let manager =
            runtime.block_on(ConnectionManager::connect(options, port, registry, B::selection()))?;

        Ok(Self {
            manager,
            runtime,
            last_state: CallState::Idle,
            _backend: PhantomData,
        })
    }

    /// Re-establish the connection now.
    ///
    /// # Errors
    /// `ConnectionError` if no driver matches or the server refuses; the
    /// previous connection is kept in that case.
    pub fn reconnect(&mut self) -> Result<(), SqlFacadeError> {
        let Self {
            manager, runtime, ..
        } = self;
        runtime.block_on(manager.reconnect())
    }

    /// Changes every time the native connection is replaced.
    #[must_use]
    pub fn connection_generation(&self) -> u64 {
        self.manager.generation()
    }

    #[must_use]
    pub fn last_call_state(&self) -> CallState {
        self.last_state
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        B::DATABASE_TYPE
    }

    #[must_use]
    pub fn options(&self) -> &ConnectOptions {
        self.manager.options()
    }

    fn run(&mut self, statement: Statement<'_>, commit: bool) -> Result<Outcome, SqlFacadeError> {
        let Self {
            manager,
            runtime,
            last_state,
            ..
        } = self;
        *last_state = CallState::Executing;

        runtime.block_on(async move {
            let conn = manager.connection_mut();
            let result = match statement {
                Statement::Execute { sql, params } => {
                    conn.execute(sql, params).await.map(Outcome::RowCount)
                }
                Statement::Query { sql, params } => {
                    conn.query(sql, params).await.map(Outcome::Rows)
                }
                Statement::Call { name, args } => {
                    conn.call_routine(name, args).await.map(Outcome::Rows)
                }
            };

            match result {
                Ok(outcome) => {
                    if commit {
                        if let Err(err) = manager.connection_mut().commit().await {
                            *last_state = CallState::CommitFailed;
                            return Err(err);
                        }
                        debug!(backend = ?B::DATABASE_TYPE, "committed");
                        *last_state = CallState::Committed;
                    } else {
                        *last_state = CallState::Fetched;
                    }
                    Ok(outcome)
                }
                Err(err) if err.is_operational() => {
                    warn!(backend = ?B::DATABASE_TYPE, "transport failure, reconnecting");
                    if let Err(reconnect_err) = manager.reconnect().await {
                        warn!(
                            error = %reconnect_err,
                            "reconnect failed, keeping previous connection"
                        );
                    }
                    *last_state = CallState::ReconnectedAndFailed;
                    Err(err)
                }
                Err(err) => {
                    debug!(backend = ?B::DATABASE_TYPE, "statement failed, rolling back");
                    if let Err(rollback_err) = manager.connection_mut().rollback().await {
                        warn!(error = %rollback_err, "rollback failed");
                    }
                    *last_state = CallState::RolledBack;
                    Err(err)
                }
            }
        })
    }
}

fn convert_affected_rows(rows: u64) -> Result<usize, SqlFacadeError> {
    usize::try_from(rows).map_err(|e| {
        SqlFacadeError::ExecutionError(format!("Invalid rows affected count: {e}"))
    })
}

impl<B: Backend> SqlExecutor for Database<B> {
    fn perform(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, SqlFacadeError> {
        match self.run(Statement::Execute { sql, params }, true)? {
            Outcome::RowCount(rows) => convert_affected_rows(rows),
            Outcome::Rows(result_set) => Ok(result_set.rows_affected),
        }
    }

    fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Rows, SqlFacadeError> {
        match self.run(Statement::Query { sql, params }, false)? {
            Outcome::Rows(result_set) => Ok(result_set.into_rows()),
            Outcome::RowCount(_) => Ok(ResultSet::default().into_rows()),
        }
    }

    fn procedure(&mut self, name: &str, args: &NamedArgs) -> Result<usize, SqlFacadeError> {
        match B::CALL_STYLE {
            CallStyle::Synthesized => {
                let (sql, values) = synthesize_call(name, args)?;
                self.perform(&sql, &values)
            }
            CallStyle::Native => match self.run(Statement::Call { name, args }, true)? {
                Outcome::Rows(result_set) => Ok(result_set.rows_affected),
                Outcome::RowCount(rows) => convert_affected_rows(rows),
            },
        }
    }

    fn function(&mut self, name: &str, args: &NamedArgs) -> Result<Rows, SqlFacadeError> {
        match B::CALL_STYLE {
            CallStyle::Synthesized => {
                let (sql, values) = synthesize_call(name, args)?;
                self.select(&sql, &values)
            }
            CallStyle::Native => match self.run(Statement::Call { name, args }, false)? {
                Outcome::Rows(result_set) => Ok(result_set.into_rows()),
                Outcome::RowCount(_) => Ok(ResultSet::default().into_rows()),
            },
        }
    }
}
