use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures_util::TryStreamExt;
use tiberius::numeric::Numeric;
use tiberius::{ColumnData, FromSql, QueryItem, QueryStream};

use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set from a SQL Server query stream.
///
/// Only the first result set is kept; the rest of the stream is drained so
/// the connection is ready for the next statement.
///
/// # Errors
/// Returns the native tiberius error if fetching fails, or
/// `SqlFacadeError::ExecutionError` if a row does not fit the column metadata.
pub async fn build_result_set(mut stream: QueryStream<'_>) -> Result<ResultSet, SqlFacadeError> {
    let mut result_set = ResultSet::default();

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) if meta.result_index() == 0 => {
                let column_names = meta
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
                result_set.set_column_names(Arc::new(column_names));
            }
            QueryItem::Row(row) if row.result_index() == 0 => {
                let row_values = row
                    .into_iter()
                    .map(|data| column_value(&data))
                    .collect::<Result<Vec<_>, _>>()?;
                result_set.add_row_values(row_values)?;
            }
            _ => {}
        }
    }

    Ok(result_set)
}

/// Convert one SQL Server cell into a `RowValues`.
fn column_value(data: &ColumnData<'static>) -> Result<RowValues, SqlFacadeError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| RowValues::Text(s.to_string())),
        ColumnData::Guid(v) => v.as_ref().map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| RowValues::Blob(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| RowValues::Float(numeric_to_f64(n))),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| RowValues::Text((**xml).clone().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?.map(RowValues::Timestamp)
        }
        ColumnData::DateTimeOffset(_) => {
            DateTime::<Utc>::from_sql(data)?.map(|dt| RowValues::Timestamp(dt.naive_utc()))
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(RowValues::Timestamp),
        ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(|t| RowValues::Text(t.to_string())),
        #[allow(unreachable_patterns)]
        _ => None,
    };

    Ok(value.unwrap_or(RowValues::Null))
}

#[allow(clippy::cast_precision_loss)]
fn numeric_to_f64(n: &Numeric) -> f64 {
    n.value() as f64 / 10f64.powi(i32::from(n.scale()))
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn integers_widen_to_int() {
        assert_eq!(
            column_value(&ColumnData::I32(Some(7))).unwrap(),
            RowValues::Int(7)
        );
        assert_eq!(
            column_value(&ColumnData::U8(Some(255))).unwrap(),
            RowValues::Int(255)
        );
    }

    #[test]
    fn typed_nulls_become_null() {
        assert!(column_value(&ColumnData::I64(None)).unwrap().is_null());
        assert!(column_value(&ColumnData::String(None)).unwrap().is_null());
    }

    #[test]
    fn text_and_bits() {
        assert_eq!(
            column_value(&ColumnData::String(Some(Cow::Borrowed("hi")))).unwrap(),
            RowValues::Text("hi".into())
        );
        assert_eq!(
            column_value(&ColumnData::Bit(Some(true))).unwrap(),
            RowValues::Bool(true)
        );
    }

    #[test]
    fn numeric_respects_scale() {
        let n = Numeric::new_with_scale(12345, 2);
        assert_eq!(
            column_value(&ColumnData::Numeric(Some(n))).unwrap(),
            RowValues::Float(123.45)
        );
    }
}
