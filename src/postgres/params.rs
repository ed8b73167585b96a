use std::error::Error;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_postgres::types::{IsNull, ToSql, Type};
use tokio_util::bytes;
use uuid::Uuid;

use crate::types::RowValues;

/// Borrowed `ToSql` views over a parameter slice, in binding order.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

/// Encodes against the type the server inferred for the placeholder, so an
/// `Int` binds to `int2`/`int4`/`int8`/`numeric` alike (range-checked) and a
/// `Timestamp` binds to `timestamp`, `timestamptz`, `date` or `time`.
///
/// Placeholders the server types as text (including an untyped `SELECT $1`)
/// receive the value's text form. `Text` parses into `numeric`, `uuid`,
/// `time` and `json` slots.
impl ToSql for RowValues {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if is_text_slot(ty) {
            return match self {
                RowValues::Text(s) => s.to_sql(ty, out),
                RowValues::Null => Ok(IsNull::Yes),
                RowValues::Blob(_) => Err(mismatch(self, ty)),
                other => text_form(other).to_sql(ty, out),
            };
        }

        match self {
            RowValues::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Text(s) => match *ty {
                Type::NUMERIC => s.parse::<Decimal>()?.to_sql(ty, out),
                Type::UUID => Uuid::parse_str(s)?.to_sql(ty, out),
                Type::TIME => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")?.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::from_str::<Value>(s)?.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMP => dt.to_sql(ty, out),
                Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
                Type::DATE => dt.date().to_sql(ty, out),
                Type::TIME => dt.time().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => match *ty {
                Type::JSON | Type::JSONB => jsval.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            RowValues::Blob(bytes) => match *ty {
                Type::BYTEA => bytes.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        is_text_slot(ty)
            || matches!(
                *ty,
                Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::NUMERIC
                    | Type::BOOL
                    | Type::TIMESTAMP
                    | Type::TIMESTAMPTZ
                    | Type::DATE
                    | Type::TIME
                    | Type::UUID
                    | Type::JSON
                    | Type::JSONB
                    | Type::BYTEA
            )
    }

    /// NULL binds to any column type; other values must match `accepts`.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }
        if !<Self as ToSql>::accepts(ty) {
            return Err(mismatch(self, ty));
        }
        self.to_sql(ty, out)
    }
}

fn is_text_slot(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN)
}

fn text_form(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => f.to_string(),
        RowValues::Text(s) => s.clone(),
        RowValues::Bool(b) => b.to_string(),
        RowValues::Timestamp(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        RowValues::JSON(jsval) => jsval.to_string(),
        RowValues::Null | RowValues::Blob(_) => String::new(),
    }
}

fn mismatch(value: &RowValues, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {value:?} to a {ty} parameter").into()
}
