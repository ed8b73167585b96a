use tokio_postgres::Config as PgConfig;

use crate::config::ConnectOptions;

/// Translate facade options into a tokio-postgres configuration.
#[must_use]
pub fn build_postgres_config(opts: &ConnectOptions, port: u16) -> PgConfig {
    let mut config = PgConfig::new();
    config
        .host(&opts.host)
        .port(port)
        .user(&opts.user)
        .password(&opts.password)
        .dbname(&opts.database);
    if let Some(name) = &opts.application_name {
        config.application_name(name);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_every_field() {
        let opts = ConnectOptions::builder("app", "pw", "shop")
            .host("pg.internal")
            .application_name("reports")
            .finish();
        let config = build_postgres_config(&opts, 5432);
        assert_eq!(config.get_user(), Some("app"));
        assert_eq!(config.get_password(), Some(&b"pw"[..]));
        assert_eq!(config.get_dbname(), Some("shop"));
        assert_eq!(config.get_ports(), &[5432]);
        assert_eq!(config.get_application_name(), Some("reports"));
    }
}
