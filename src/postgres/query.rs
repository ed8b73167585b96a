use std::error::Error;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use tokio_postgres::Statement;
use tokio_postgres::types::{FromSql, Kind, Type};
use uuid::Uuid;

use crate::error::SqlFacadeError;
use crate::results::ResultSet;
use crate::synthesis::{check_argument_names, check_routine_name};
use crate::types::{NamedArgs, RowValues};

/// Build a result set using statement metadata for column names, so the
/// columns are known even when no rows come back.
///
/// # Errors
/// Returns the native error if a value cannot be decoded.
pub fn build_result_set(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlFacadeError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values)?;
    }

    Ok(result_set)
}

/// Build a result set from rows that carry their own column metadata.
///
/// # Errors
/// Returns the native error if a value cannot be decoded.
pub fn build_result_set_from_rows(
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlFacadeError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    for row in rows {
        let mut pairs = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            pairs.push((column.name().to_string(), postgres_extract_value(row, idx)?));
        }
        result_set.add_keyed_row(pairs)?;
    }
    Ok(result_set)
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// Types without a dedicated variant are read as text where the server's
/// binary form is text (`citext`, enums, `"char"`) or has a canonical text
/// rendering (`uuid`, `time`, `interval`, `inet`); anything else comes back
/// as its raw bytes.
///
/// # Errors
/// Returns `SqlFacadeError::PostgresError` if the column cannot be decoded.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, SqlFacadeError> {
    let ty = row.columns()[idx].type_();
    let value = match *ty {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(RowValues::Int),
        Type::OID => row
            .try_get::<_, Option<u32>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(RowValues::Float),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(idx)?.map(decimal_value),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|dt| RowValues::Timestamp(dt.naive_utc())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(RowValues::Timestamp),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map(|t| RowValues::Text(t.to_string())),
        Type::INTERVAL => row
            .try_get::<_, Option<Interval>>(idx)?
            .map(|iv| RowValues::Text(iv.to_string())),
        Type::UUID => row
            .try_get::<_, Option<Uuid>>(idx)?
            .map(|u| RowValues::Text(u.to_string())),
        Type::INET => row
            .try_get::<_, Option<IpAddr>>(idx)?
            .map(|ip| RowValues::Text(ip.to_string())),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx)?.map(RowValues::JSON),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(RowValues::Blob),
        // Functions returning void still yield one row.
        Type::VOID => None,
        _ if reads_as_text(ty) => row
            .try_get::<_, Option<RawValue<'_>>>(idx)?
            .map(|raw| RowValues::Text(String::from_utf8_lossy(raw.0).into_owned())),
        _ => row
            .try_get::<_, Option<RawValue<'_>>>(idx)?
            .map(|raw| RowValues::Blob(raw.0.to_vec())),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

fn decimal_value(d: Decimal) -> RowValues {
    d.to_f64().map_or_else(|| RowValues::Text(d.to_string()), RowValues::Float)
}

fn reads_as_text(ty: &Type) -> bool {
    <&str as FromSql>::accepts(ty)
        || *ty == Type::CHAR
        || matches!(ty.kind(), Kind::Enum(_))
        || ty.name() == "citext"
}

/// The undecoded wire value of a column of any type.
struct RawValue<'a>(&'a [u8]);

impl<'a> FromSql<'a> for RawValue<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawValue(raw))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// A `PostgreSQL` interval, rendered as an ISO 8601 duration the server
/// accepts back as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    months: i32,
    days: i32,
    micros: i64,
}

impl<'a> FromSql<'a> for Interval {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        if raw.len() != 16 {
            return Err(format!("interval must be 16 bytes, got {}", raw.len()).into());
        }
        Ok(Interval {
            micros: i64::from_be_bytes(raw[0..8].try_into()?),
            days: i32::from_be_bytes(raw[8..12].try_into()?),
            months: i32::from_be_bytes(raw[12..16].try_into()?),
        })
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}M{}DT", self.months, self.days)?;
        let sign = if self.micros < 0 { "-" } else { "" };
        let micros = self.micros.unsigned_abs();
        let (secs, frac) = (micros / 1_000_000, micros % 1_000_000);
        if frac == 0 {
            write!(f, "{sign}{secs}S")
        } else {
            let frac = format!("{frac:06}");
            write!(f, "{sign}{secs}.{}S", frac.trim_end_matches('0'))
        }
    }
}

/// `SELECT * FROM name(k1 => $1, k2 => $2)`, the named-notation call the
/// connection uses for stored routines.
///
/// # Errors
/// Returns `SqlFacadeError::ParameterError` for non-identifier names.
pub fn routine_call_sql(name: &str, args: &NamedArgs) -> Result<String, SqlFacadeError> {
    check_routine_name(name)?;
    check_argument_names(args)?;
    let assignments: Vec<String> = args
        .names()
        .enumerate()
        .map(|(i, key)| format!("{key} => ${}", i + 1))
        .collect();
    Ok(format!("SELECT * FROM {name}({})", assignments.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_call_uses_named_notation_in_order() {
        let args = NamedArgs::new().arg("name", "a").arg("age", 3);
        assert_eq!(
            routine_call_sql("add_user", &args).unwrap(),
            "SELECT * FROM add_user(name => $1, age => $2)"
        );
    }

    #[test]
    fn routine_call_without_arguments() {
        assert_eq!(
            routine_call_sql("public.now_utc", &NamedArgs::new()).unwrap(),
            "SELECT * FROM public.now_utc()"
        );
    }

    #[test]
    fn interval_decodes_from_wire_form() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&5_500_000_i64.to_be_bytes());
        raw.extend_from_slice(&3_i32.to_be_bytes());
        raw.extend_from_slice(&14_i32.to_be_bytes());
        let iv = Interval::from_sql(&Type::INTERVAL, &raw).unwrap();
        assert_eq!(
            iv,
            Interval {
                months: 14,
                days: 3,
                micros: 5_500_000
            }
        );
        assert_eq!(iv.to_string(), "P14M3DT5.5S");
        assert!(Interval::from_sql(&Type::INTERVAL, &raw[..8]).is_err());
    }

    #[test]
    fn negative_whole_second_interval() {
        let iv = Interval {
            months: 0,
            days: -1,
            micros: -7_000_000,
        };
        assert_eq!(iv.to_string(), "P0M-1DT-7S");
    }

    #[test]
    fn numeric_reads_as_float() {
        assert_eq!(
            decimal_value("12.34".parse().unwrap()),
            RowValues::Float(12.34)
        );
        assert_eq!(decimal_value(Decimal::from(5)), RowValues::Float(5.0));
    }

    #[test]
    fn text_like_types_are_recognized() {
        assert!(reads_as_text(&Type::TEXT));
        assert!(reads_as_text(&Type::CHAR));
        assert!(!reads_as_text(&Type::INT4_ARRAY));
        assert!(RawValue::accepts(&Type::TS_VECTOR));
    }

    #[test]
    fn routine_call_rejects_bad_names() {
        assert!(routine_call_sql("f(); drop table t; --", &NamedArgs::new()).is_err());
    }
}
