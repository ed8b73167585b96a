#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_facade::prelude::*;
use sql_facade::{Driver, DriverRegistry, NativeConnection, ResultSet};

/// Everything a scripted connection saw and will do next.
#[derive(Default)]
pub struct Script {
    pub connects: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub executed: Vec<(String, Vec<RowValues>)>,
    pub calls: Vec<(String, NamedArgs)>,
    pub failures: VecDeque<SqlFacadeError>,
    pub commit_failure: Option<SqlFacadeError>,
    pub results: VecDeque<ResultSet>,
    pub affected: u64,
    pub refuse_connect: bool,
}

pub type Shared = Arc<Mutex<Script>>;

pub fn script() -> Shared {
    Arc::new(Mutex::new(Script::default()))
}

pub fn transport_failure() -> SqlFacadeError {
    SqlFacadeError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))
}

pub fn constraint_violation() -> SqlFacadeError {
    SqlFacadeError::ExecutionError("duplicate key value violates unique constraint".into())
}

pub fn result_set(rows: &[&[(&str, RowValues)]]) -> ResultSet {
    let mut rs = ResultSet::default();
    for row in rows {
        let pairs = row
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        rs.add_keyed_row(pairs).unwrap();
    }
    rs
}

pub struct FakeDriver {
    pub name: &'static str,
    pub script: Shared,
}

impl FakeDriver {
    pub fn new(name: &'static str, script: &Shared) -> Self {
        Self {
            name,
            script: Arc::clone(script),
        }
    }
}

#[async_trait]
impl Driver for FakeDriver {
    fn name(&self) -> &str {
        self.name
    }

    async fn connect(
        &self,
        _options: &ConnectOptions,
        _port: u16,
    ) -> Result<Box<dyn NativeConnection>, SqlFacadeError> {
        let mut s = self.script.lock().unwrap();
        if s.refuse_connect {
            return Err(SqlFacadeError::ConnectionError("connection refused".into()));
        }
        s.connects += 1;
        Ok(Box::new(FakeConnection {
            script: Arc::clone(&self.script),
        }))
    }
}

pub struct FakeConnection {
    script: Shared,
}

#[async_trait]
impl NativeConnection for FakeConnection {
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlFacadeError> {
        let mut s = self.script.lock().unwrap();
        s.executed.push((sql.to_string(), params.to_vec()));
        match s.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(s.affected),
        }
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlFacadeError> {
        let mut s = self.script.lock().unwrap();
        s.executed.push((sql.to_string(), params.to_vec()));
        match s.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(s.results.pop_front().unwrap_or_default()),
        }
    }

    async fn call_routine(
        &mut self,
        name: &str,
        args: &NamedArgs,
    ) -> Result<ResultSet, SqlFacadeError> {
        let mut s = self.script.lock().unwrap();
        s.calls.push((name.to_string(), args.clone()));
        match s.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(s.results.pop_front().unwrap_or_default()),
        }
    }

    async fn commit(&mut self) -> Result<(), SqlFacadeError> {
        let mut s = self.script.lock().unwrap();
        if let Some(err) = s.commit_failure.take() {
            return Err(err);
        }
        s.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        self.script.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

pub fn options() -> ConnectOptions {
    ConnectOptions::new("app", "pw", "shop")
}

pub fn mssql_registry(script: &Shared) -> DriverRegistry {
    DriverRegistry::new()
        .with_driver(FakeDriver::new("SQLite3 ODBC Driver", script))
        .with_driver(FakeDriver::new("ODBC Driver 18 for SQL Server", script))
}

pub fn postgres_registry(script: &Shared) -> DriverRegistry {
    DriverRegistry::new().with_driver(FakeDriver::new("fake-postgres", script))
}

pub fn mssql(script: &Shared) -> MssqlDatabase {
    MssqlDatabase::connect_with(options(), mssql_registry(script)).unwrap()
}

pub fn postgres(script: &Shared) -> PostgresDatabase {
    PostgresDatabase::connect_with(options(), postgres_registry(script)).unwrap()
}

/// Unwrap the error side without requiring `Debug` on the success type.
pub fn expect_err<T>(result: Result<T, SqlFacadeError>) -> SqlFacadeError {
    match result {
        Err(err) => err,
        Ok(_) => panic!("expected an error"),
    }
}
