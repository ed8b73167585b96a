use crate::driver::{DriverRegistry, DriverSelection};
use crate::types::DatabaseType;

/// How `procedure`/`function` reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// Synthesize `exec name @k=?, ...` and run it through `perform`/`select`.
    Synthesized,
    /// Use the connection's own routine-call primitive.
    Native,
}

/// Compile-time description of one database backend.
pub trait Backend: 'static {
    const DATABASE_TYPE: DatabaseType;
    const CALL_STYLE: CallStyle;

    /// How a driver is picked out of the registry.
    fn selection() -> DriverSelection;

    /// Drivers compiled into this build. Empty when the backend's cargo
    /// feature is disabled.
    fn installed_drivers() -> DriverRegistry;
}

/// SQL Server through tiberius.
#[derive(Debug, Clone, Copy)]
pub struct Mssql;

/// `PostgreSQL` through tokio-postgres.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

/// Drivers for SQL Server advertise this in their name.
pub const MSSQL_DRIVER_MARKER: &str = "SQL Server";

impl Backend for Mssql {
    const DATABASE_TYPE: DatabaseType = DatabaseType::Mssql;
    const CALL_STYLE: CallStyle = CallStyle::Synthesized;

    fn selection() -> DriverSelection {
        DriverSelection::NameContains(MSSQL_DRIVER_MARKER)
    }

    fn installed_drivers() -> DriverRegistry {
        #[cfg(feature = "mssql")]
        {
            DriverRegistry::new().with_driver(crate::mssql::TiberiusDriver)
        }
        #[cfg(not(feature = "mssql"))]
        {
            DriverRegistry::new()
        }
    }
}

impl Backend for Postgres {
    const DATABASE_TYPE: DatabaseType = DatabaseType::Postgres;
    const CALL_STYLE: CallStyle = CallStyle::Native;

    fn selection() -> DriverSelection {
        DriverSelection::Direct
    }

    fn installed_drivers() -> DriverRegistry {
        #[cfg(feature = "postgres")]
        {
            DriverRegistry::new().with_driver(crate::postgres::TokioPostgresDriver)
        }
        #[cfg(not(feature = "postgres"))]
        {
            DriverRegistry::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_drivers_follow_features() {
        assert_eq!(
            Mssql::installed_drivers().is_empty(),
            cfg!(not(feature = "mssql"))
        );
        assert_eq!(
            Postgres::installed_drivers().is_empty(),
            cfg!(not(feature = "postgres"))
        );
    }

    #[cfg(feature = "mssql")]
    #[test]
    fn tiberius_driver_matches_the_mssql_marker() {
        let registry = Mssql::installed_drivers();
        let driver = registry.select(Mssql::selection()).unwrap();
        assert!(driver.name().contains(MSSQL_DRIVER_MARKER));
    }
}
