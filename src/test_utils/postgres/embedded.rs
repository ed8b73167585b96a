use super::super::SHARED_RUNTIME;
use crate::backend::Postgres;
use crate::config::ConnectOptions;
use crate::executor::{Database, SqlExecutor};

use postgresql_embedded::PostgreSQL;

/// A running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Options that reach the provisioned database with the server's own credentials
    pub options: ConnectOptions,
}

/// Start an embedded `PostgreSQL` server and create `db_name` on it.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, if the
/// database cannot be created, or if the post-start connectivity check fails.
pub fn setup_postgres_embedded(
    db_name: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    let (postgresql, options) = SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // Bundled binaries, nothing downloaded
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(db_name).await?;

        let settings = postgresql.settings();
        let options = ConnectOptions::builder(
            settings.username.clone(),
            settings.password.clone(),
            db_name,
        )
        .host(settings.host.clone())
        .port(Some(settings.port))
        .application_name("sql-facade-tests")
        .finish();

        Ok::<_, Box<dyn std::error::Error>>((postgresql, options))
    })?;

    // The handle drives its own runtime, so this runs outside the shared one.
    let mut db = Database::<Postgres>::connect(options.clone())?;
    db.select("SELECT 1", &[])?;

    let port = postgresql.settings().port;
    Ok(EmbeddedPostgres {
        postgresql,
        port,
        options,
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
