use async_trait::async_trait;
use tokio_postgres::Client;

use super::params::Params;
use super::query::{build_result_set, build_result_set_from_rows, routine_call_sql};
use crate::driver::NativeConnection;
use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::{NamedArgs, RowValues};

/// A `PostgreSQL` session that opens a transaction before the first statement
/// after each commit or rollback.
pub struct PostgresConnection {
    client: Client,
    in_transaction: bool,
}

impl PostgresConnection {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            in_transaction: false,
        }
    }

    async fn begin_if_idle(&mut self) -> Result<(), SqlFacadeError> {
        if !self.in_transaction {
            self.client.batch_execute("BEGIN").await?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

#[async_trait]
impl NativeConnection for PostgresConnection {
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlFacadeError> {
        self.begin_if_idle().await?;
        let sql = translate_placeholders(sql, PlaceholderStyle::Postgres);
        let converted = Params::convert(params);
        Ok(self.client.execute(&*sql, converted.as_refs()).await?)
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlFacadeError> {
        self.begin_if_idle().await?;
        let sql = translate_placeholders(sql, PlaceholderStyle::Postgres);
        let stmt = self.client.prepare(&*sql).await?;
        let converted = Params::convert(params);
        let rows = self.client.query(&stmt, converted.as_refs()).await?;
        build_result_set(&stmt, &rows)
    }

    async fn call_routine(
        &mut self,
        name: &str,
        args: &NamedArgs,
    ) -> Result<ResultSet, SqlFacadeError> {
        let sql = routine_call_sql(name, args)?;
        self.begin_if_idle().await?;
        let values = args.values();
        let converted = Params::convert(&values);
        let rows = self.client.query(sql.as_str(), converted.as_refs()).await?;
        build_result_set_from_rows(&rows)
    }

    async fn commit(&mut self) -> Result<(), SqlFacadeError> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.batch_execute("COMMIT").await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        if self.in_transaction {
            self.in_transaction = false;
            self.client.batch_execute("ROLLBACK").await?;
        }
        Ok(())
    }
}
