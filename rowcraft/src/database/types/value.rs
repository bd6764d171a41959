//! Unified SQL value type
//!
//! `SqlValue` is what the builder binds as arguments and what the metadata
//! engine reads out of, and writes back into, entity members.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::models::query_builder::SqlDialect;

/// Empty argument list for clauses that bind nothing
pub const NO_ARGS: [SqlValue; 0] = [];

/// Generic SQL value for parameter binding and member transfer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,

    Bool(bool),

    // Integer variants keep the width of the Rust type they came from
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),

    UnsignedTinyInt(u8),
    UnsignedSmallInt(u16),
    UnsignedInt(u32),
    UnsignedBigInt(u64),

    Float(f32),
    Double(f64),
    #[cfg(feature = "decimal")]
    Decimal(rust_decimal::Decimal),

    String(String),
    Bytes(Vec<u8>),

    Uuid(uuid::Uuid),
    Json(JsonValue),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Short name of the variant, used in conversion errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::TinyInt(_) => "i8",
            SqlValue::SmallInt(_) => "i16",
            SqlValue::Int(_) => "i32",
            SqlValue::BigInt(_) => "i64",
            SqlValue::UnsignedTinyInt(_) => "u8",
            SqlValue::UnsignedSmallInt(_) => "u16",
            SqlValue::UnsignedInt(_) => "u32",
            SqlValue::UnsignedBigInt(_) => "u64",
            SqlValue::Float(_) => "f32",
            SqlValue::Double(_) => "f64",
            #[cfg(feature = "decimal")]
            SqlValue::Decimal(_) => "decimal",
            SqlValue::String(_) => "string",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Json(_) => "json",
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
        }
    }

    /// Widen any integer variant so it can be range-checked into another width
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            SqlValue::TinyInt(i) => Some(i128::from(*i)),
            SqlValue::SmallInt(i) => Some(i128::from(*i)),
            SqlValue::Int(i) => Some(i128::from(*i)),
            SqlValue::BigInt(i) => Some(i128::from(*i)),
            SqlValue::UnsignedTinyInt(i) => Some(i128::from(*i)),
            SqlValue::UnsignedSmallInt(i) => Some(i128::from(*i)),
            SqlValue::UnsignedInt(i) => Some(i128::from(*i)),
            SqlValue::UnsignedBigInt(i) => Some(i128::from(*i)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Float(f) => Some(f64::from(*f)),
            SqlValue::Double(f) => Some(*f),
            other => other.as_i128().map(|i| i as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value is its type's zero or empty value
    ///
    /// Null counts as zero, as do empty strings, byte strings, and JSON null.
    pub fn is_zero(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Bool(b) => !b,
            SqlValue::Float(f) => *f == 0.0,
            SqlValue::Double(f) => *f == 0.0,
            #[cfg(feature = "decimal")]
            SqlValue::Decimal(d) => d.is_zero(),
            SqlValue::String(s) => s.is_empty(),
            SqlValue::Bytes(b) => b.is_empty(),
            SqlValue::Uuid(u) => u.is_nil(),
            SqlValue::Json(j) => j.is_null(),
            SqlValue::Date(d) => *d == NaiveDate::default(),
            SqlValue::Time(t) => *t == NaiveTime::default(),
            SqlValue::Timestamp(ts) => *ts == NaiveDateTime::default(),
            SqlValue::TimestampTz(ts) => *ts == DateTime::<Utc>::default(),
            other => other.as_i128() == Some(0),
        }
    }

    /// Render the value as an inline SQL literal for the given dialect
    ///
    /// Intended for logging and DDL defaults; statements should bind values
    /// as arguments instead.
    pub fn to_sql_literal(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => dialect.format_bool(*b).to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Double(f) => f.to_string(),
            #[cfg(feature = "decimal")]
            SqlValue::Decimal(d) => d.to_string(),
            SqlValue::String(s) => quote_text(s),
            SqlValue::Bytes(bytes) => format!("X'{}'", hex_encode(bytes)),
            SqlValue::Uuid(u) => format!("'{}'", u),
            SqlValue::Json(j) => quote_text(&j.to_string()),
            SqlValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            SqlValue::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
            SqlValue::Timestamp(ts) => dialect.format_time(ts),
            SqlValue::TimestampTz(ts) => dialect.format_time(&ts.naive_utc()),
            other => other
                .as_i128()
                .map(|i| i.to_string())
                .unwrap_or_else(|| "NULL".to_string()),
        }
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Float(fl) => write!(f, "{}", fl),
            SqlValue::Double(d) => write!(f, "{}", d),
            #[cfg(feature = "decimal")]
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::String(s) => write!(f, "{}", s),
            SqlValue::Bytes(b) => write!(f, "<binary:{} bytes>", b.len()),
            SqlValue::Uuid(u) => write!(f, "{}", u),
            SqlValue::Json(j) => write!(f, "{}", j),
            SqlValue::Date(d) => write!(f, "{}", d),
            SqlValue::Time(t) => write!(f, "{}", t),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts),
            SqlValue::TimestampTz(ts) => write!(f, "{}", ts.to_rfc3339()),
            other => match other.as_i128() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "NULL"),
            },
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant(v)
                }
            }

            impl From<&$ty> for SqlValue {
                fn from(v: &$ty) -> Self {
                    SqlValue::$variant(v.clone())
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    u8 => UnsignedTinyInt,
    u16 => UnsignedSmallInt,
    u32 => UnsignedInt,
    u64 => UnsignedBigInt,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    uuid::Uuid => Uuid,
    JsonValue => Json,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
}

#[cfg(feature = "decimal")]
impl_from_value! {
    rust_decimal::Decimal => Decimal,
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::String(s.to_string())
    }
}

impl From<&[u8]> for SqlValue {
    fn from(b: &[u8]) -> Self {
        SqlValue::Bytes(b.to_vec())
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => SqlValue::Null,
        }
    }
}
