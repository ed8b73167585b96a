use std::sync::LazyLock;
use tokio::runtime::Runtime;

/// Shared tokio runtime for the embedded server's own lifecycle calls
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Test utilities for `PostgreSQL`
pub mod postgres;

pub use postgres::*;
