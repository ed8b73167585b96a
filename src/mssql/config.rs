use tiberius::{AuthMethod, Config as TiberiusConfig};

use crate::config::ConnectOptions;

/// Translate facade options into a tiberius configuration.
#[must_use]
pub fn build_tiberius_config(opts: &ConnectOptions, port: u16) -> TiberiusConfig {
    let mut config = TiberiusConfig::new();
    config.host(&opts.host);
    config.port(port);
    config.database(&opts.database);
    config.authentication(AuthMethod::sql_server(&opts.user, &opts.password));
    if let Some(name) = &opts.application_name {
        config.application_name(name);
    }
    if opts.trust_cert {
        config.trust_cert();
    }
    config
}
