use std::collections::HashMap;
use std::sync::Arc;

use super::row::{DbRow, build_column_index};
use crate::error::SqlFacadeError;
use crate::types::RowValues;

/// A fully fetched query result.
///
/// Rows arrive in one of two shapes and are normalized here:
/// positional value tuples after [`ResultSet::set_column_names`], or
/// self-describing `(name, value)` rows through [`ResultSet::add_keyed_row`].
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<DbRow>,
    /// Number of rows materialized
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Set the column names for this result set (shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Some(Arc::new(build_column_index(&column_names)));
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a positional row; values pair with the column names by position.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ExecutionError` if no column names were set or
    /// the value count does not match the column count.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) -> Result<(), SqlFacadeError> {
        let (Some(column_names), Some(column_index)) = (&self.column_names, &self.column_index)
        else {
            return Err(SqlFacadeError::ExecutionError(
                "No column names available".to_string(),
            ));
        };
        if row_values.len() != column_names.len() {
            return Err(SqlFacadeError::ExecutionError(format!(
                "row has {} values for {} columns",
                row_values.len(),
                column_names.len()
            )));
        }

        self.results.push(DbRow::from_parts(
            Arc::clone(column_names),
            Arc::clone(column_index),
            row_values,
        ));
        self.rows_affected += 1;
        Ok(())
    }

    /// Add a row that carries its own column names.
    ///
    /// The first keyed row fixes the column order for the whole set.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ExecutionError` if the row's columns differ from
    /// the columns already established.
    pub fn add_keyed_row(&mut self, pairs: Vec<(String, RowValues)>) -> Result<(), SqlFacadeError> {
        let (names, values): (Vec<String>, Vec<RowValues>) = pairs.into_iter().unzip();
        if let Some(existing) = &self.column_names {
            if existing.as_slice() != names.as_slice() {
                return Err(SqlFacadeError::ExecutionError(format!(
                    "row columns {names:?} do not match result columns {existing:?}"
                )));
            }
        } else {
            self.set_column_names(Arc::new(names));
        }
        self.add_row_values(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Hand the rows over as an iterator.
    #[must_use]
    pub fn into_rows(self) -> super::Rows {
        super::Rows::new(self.column_names, self.results)
    }
}
