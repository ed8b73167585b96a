use std::error::Error as _;

use tokio_postgres::error::SqlState;

/// Whether a tokio-postgres error leaves the connection unusable.
///
/// Covers a closed client, I/O failures, SQLSTATE class 08 (connection
/// exception) and the 57P01..57P03 shutdown states.
#[must_use]
pub fn is_operational(err: &tokio_postgres::Error) -> bool {
    if err.is_closed() {
        return true;
    }
    if let Some(state) = err.code() {
        return state.code().starts_with("08")
            || *state == SqlState::ADMIN_SHUTDOWN
            || *state == SqlState::CRASH_SHUTDOWN
            || *state == SqlState::CANNOT_CONNECT_NOW;
    }
    err.source()
        .is_some_and(|source| source.downcast_ref::<std::io::Error>().is_some())
}
