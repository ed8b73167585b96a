use tiberius::Query;

use crate::types::RowValues;

/// Bind parameters onto a tiberius query, in order.
///
/// `sql` must already use tiberius' `@P1..@Pn` placeholders. Timestamps bind
/// as `datetime2`; JSON binds as its text form.
#[must_use]
pub fn bind_query_params<'a>(sql: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query = Query::new(sql);

    for param in params {
        match param {
            RowValues::Int(i) => query.bind(*i),
            RowValues::Float(f) => query.bind(*f),
            RowValues::Text(s) => query.bind(s.clone()),
            RowValues::Bool(b) => query.bind(*b),
            RowValues::Timestamp(dt) => query.bind(*dt),
            RowValues::Null => query.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query.bind(bytes.clone()),
        }
    }

    query
}
