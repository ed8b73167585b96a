use tiberius::error::Error;

/// Severity class at and above which SQL Server terminates the connection.
const FATAL_SEVERITY: u8 = 20;

/// Whether a tiberius error leaves the connection unusable.
#[must_use]
pub fn is_operational(err: &Error) -> bool {
    match err {
        Error::Io { .. } | Error::Tls(_) | Error::Routing { .. } | Error::Protocol(_) => true,
        Error::Server(token) => is_fatal_severity(token.class()),
        _ => false,
    }
}

fn is_fatal_severity(class: u8) -> bool {
    class >= FATAL_SEVERITY
}
