mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::DbRow;

use std::sync::Arc;

/// Rows returned by `select`/`function`.
///
/// Every row has already been fetched when a `Rows` is handed out; iterating
/// never touches the connection again.
#[derive(Debug)]
pub struct Rows {
    columns: Option<Arc<Vec<String>>>,
    inner: std::vec::IntoIter<DbRow>,
}

impl Rows {
    pub(crate) fn new(columns: Option<Arc<Vec<String>>>, rows: Vec<DbRow>) -> Self {
        Self {
            columns,
            inner: rows.into_iter(),
        }
    }

    /// Column names reported by the backend, if the statement produced a result set.
    #[must_use]
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref().map(Vec::as_slice)
    }
}

impl Iterator for Rows {
    type Item = DbRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Rows {}

impl From<ResultSet> for Rows {
    fn from(result_set: ResultSet) -> Self {
        result_set.into_rows()
    }
}
