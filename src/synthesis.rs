//! Call-statement synthesis for backends without a named-call primitive.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlFacadeError;
use crate::types::{NamedArgs, RowValues};

static ROUTINE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$#]*(\.[A-Za-z_][A-Za-z0-9_$#]*){0,2}$")
        .expect("routine name pattern is valid")
});

static ARGUMENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("argument name pattern is valid")
});

/// Routine names are spliced into SQL text, so only plain (optionally
/// schema-qualified) identifiers are accepted.
///
/// # Errors
/// Returns `SqlFacadeError::ParameterError` for anything else.
pub fn check_routine_name(name: &str) -> Result<(), SqlFacadeError> {
    if ROUTINE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(SqlFacadeError::ParameterError(format!(
            "invalid routine name: {name:?}"
        )))
    }
}

/// # Errors
/// Returns `SqlFacadeError::ParameterError` if any argument name is not a plain identifier.
pub fn check_argument_names(args: &NamedArgs) -> Result<(), SqlFacadeError> {
    match args.names().find(|name| !ARGUMENT_NAME.is_match(name)) {
        Some(bad) => Err(SqlFacadeError::ParameterError(format!(
            "invalid argument name: {bad:?}"
        ))),
        None => Ok(()),
    }
}

/// Build `exec <name> @k1=?, @k2=?` plus the values in the same order.
///
/// ```rust
/// use sql_facade::prelude::*;
/// use sql_facade::synthesis::synthesize_call;
///
/// let args = NamedArgs::new().arg("name", "a").arg("age", 3);
/// let (sql, values) = synthesize_call("add_user", &args).unwrap();
/// assert_eq!(sql, "exec add_user @name=?, @age=?");
/// assert_eq!(values, vec![RowValues::Text("a".into()), RowValues::Int(3)]);
/// ```
///
/// # Errors
/// Returns `SqlFacadeError::ParameterError` if the routine or an argument name
/// is not an identifier.
pub fn synthesize_call(
    name: &str,
    args: &NamedArgs,
) -> Result<(String, Vec<RowValues>), SqlFacadeError> {
    check_routine_name(name)?;
    check_argument_names(args)?;

    let mut sql = format!("exec {name}");
    let assignments: Vec<String> = args.names().map(|key| format!("@{key}=?")).collect();
    if !assignments.is_empty() {
        sql.push(' ');
        sql.push_str(&assignments.join(", "));
    }

    Ok((sql, args.values()))
}
