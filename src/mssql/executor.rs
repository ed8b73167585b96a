use async_trait::async_trait;
use tracing::debug;

use super::client::MssqlClient;
use super::params::bind_query_params;
use super::query::build_result_set;
use crate::driver::NativeConnection;
use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::translation::{PlaceholderStyle, translate_placeholders};
use crate::types::RowValues;

/// A SQL Server session running with implicit transactions, so every
/// statement joins an open transaction until `commit` or `rollback`.
pub struct MssqlConnection {
    client: MssqlClient,
}

impl MssqlConnection {
    /// Wrap a connected client and switch the session to implicit transactions.
    ///
    /// # Errors
    /// Returns the native tiberius error if the session setting is rejected.
    pub async fn open(mut client: MssqlClient) -> Result<Self, SqlFacadeError> {
        client.execute("SET IMPLICIT_TRANSACTIONS ON", &[]).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NativeConnection for MssqlConnection {
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<u64, SqlFacadeError> {
        let sql = translate_placeholders(sql, PlaceholderStyle::Mssql);
        let exec_result = bind_query_params(&sql, params)
            .execute(&mut self.client)
            .await?;
        Ok(exec_result.rows_affected().iter().sum())
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlFacadeError> {
        let sql = translate_placeholders(sql, PlaceholderStyle::Mssql);
        let stream = bind_query_params(&sql, params)
            .query(&mut self.client)
            .await?;
        build_result_set(stream).await
    }

    async fn commit(&mut self) -> Result<(), SqlFacadeError> {
        self.client
            .execute("IF @@TRANCOUNT > 0 COMMIT TRANSACTION", &[])
            .await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlFacadeError> {
        debug!("rolling back SQL Server transaction");
        self.client
            .execute("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION", &[])
            .await?;
        Ok(())
    }
}
