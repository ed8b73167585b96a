use serde::Deserialize;

use crate::error::SqlFacadeError;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_trust_cert() -> bool {
    true
}

/// Connection parameters shared by every backend.
///
/// `port` is optional; when absent the backend's default applies
/// (1433 for SQL Server, 5432 for `PostgreSQL`).
///
/// ```rust
/// use sql_facade::prelude::*;
///
/// let opts = ConnectOptions::builder("app", "secret", "inventory")
///     .host("db.internal")
///     .port(Some(1433))
///     .finish();
/// assert_eq!(opts.host, "db.internal");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectOptions {
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// Accept the server certificate without validation (SQL Server only).
    #[serde(default = "default_trust_cert")]
    pub trust_cert: bool,
    #[serde(default)]
    pub application_name: Option<String>,
}

impl ConnectOptions {
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            database: database.into(),
            host: default_host(),
            port: None,
            trust_cert: default_trust_cert(),
            application_name: None,
        }
    }

    #[must_use]
    pub fn builder(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> ConnectOptionsBuilder {
        ConnectOptionsBuilder {
            opts: Self::new(user, password, database),
        }
    }

    /// Parse options from JSON, applying the same defaults as [`ConnectOptions::new`].
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConfigError` if the document is malformed or misses a field.
    pub fn from_json(json: &str) -> Result<Self, SqlFacadeError> {
        serde_json::from_str(json)
            .map_err(|e| SqlFacadeError::ConfigError(format!("invalid connection options: {e}")))
    }

    /// Reject empty credentials, an empty host or a zero port.
    ///
    /// Fields are checked in the order user, password, database, host, port.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), SqlFacadeError> {
        let required = [
            ("user", &self.user),
            ("password", &self.password),
            ("database", &self.database),
            ("host", &self.host),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(SqlFacadeError::ValidationError(format!(
                    "{field} is required"
                )));
            }
        }
        if self.port == Some(0) {
            return Err(SqlFacadeError::ValidationError(
                "port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn port_or(&self, default_port: u16) -> u16 {
        self.port.unwrap_or(default_port)
    }
}

/// Fluent builder for [`ConnectOptions`].
#[derive(Debug, Clone)]
pub struct ConnectOptionsBuilder {
    opts: ConnectOptions,
}

impl ConnectOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn trust_cert(mut self, trust_cert: bool) -> Self {
        self.opts.trust_cert = trust_cert;
        self
    }

    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.opts.application_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectOptions {
        self.opts
    }
}
