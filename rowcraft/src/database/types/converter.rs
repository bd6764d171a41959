//! Conversions between Rust member types and `SqlValue`
//!
//! Every type that can back an entity column implements [`ColumnType`]. The
//! derive macro relies on it to read members into values and to write
//! values back with the same widening rules everywhere.

use super::value::SqlValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use std::fmt;

/// Storage category of a column-backed member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Json,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Option(Box<ValueKind>),
}

impl ValueKind {
    /// Kind with any `Option` layers removed
    pub fn base(&self) -> &ValueKind {
        match self {
            ValueKind::Option(inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, ValueKind::Option(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.base(),
            ValueKind::I8
                | ValueKind::I16
                | ValueKind::I32
                | ValueKind::I64
                | ValueKind::U8
                | ValueKind::U16
                | ValueKind::U32
                | ValueKind::U64
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Uuid => "uuid",
            ValueKind::Json => "json",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Timestamp => "timestamp",
            ValueKind::TimestampTz => "timestamptz",
            ValueKind::Option(inner) => return write!(f, "option<{}>", inner),
        };
        f.write_str(name)
    }
}

/// A value could not be converted into a member's type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub expected: ValueKind,
    pub found: &'static str,
}

impl ConversionError {
    pub fn new(expected: ValueKind, value: &SqlValue) -> Self {
        Self {
            expected,
            found: value.kind_name(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} into {}", self.found, self.expected)
    }
}

impl std::error::Error for ConversionError {}

/// A Rust type that can back an entity column
pub trait ColumnType: Sized + 'static {
    fn value_kind() -> ValueKind;

    fn to_sql_value(&self) -> SqlValue;

    /// Convert a value into this type, widening where no information is lost
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError>;

    fn is_zero(&self) -> bool {
        self.to_sql_value().is_zero()
    }
}

macro_rules! impl_integer_column {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl ColumnType for $ty {
                fn value_kind() -> ValueKind {
                    ValueKind::$kind
                }

                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::from(*self)
                }

                fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
                    value
                        .as_i128()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| ConversionError::new(ValueKind::$kind, &value))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_integer_column! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl ColumnType for bool {
    fn value_kind() -> ValueKind {
        ValueKind::Bool
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            other => Err(ConversionError::new(ValueKind::Bool, &other)),
        }
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl ColumnType for f32 {
    fn value_kind() -> ValueKind {
        ValueKind::F32
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| ConversionError::new(ValueKind::F32, &value))
    }
}

impl ColumnType for f64 {
    fn value_kind() -> ValueKind {
        ValueKind::F64
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Double(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .ok_or_else(|| ConversionError::new(ValueKind::F64, &value))
    }
}

#[cfg(feature = "decimal")]
impl ColumnType for rust_decimal::Decimal {
    fn value_kind() -> ValueKind {
        ValueKind::Decimal
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Decimal(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Decimal(d) => Ok(d),
            other => other
                .as_i128()
                .and_then(|i| rust_decimal::Decimal::try_from_i128_with_scale(i, 0).ok())
                .ok_or_else(|| ConversionError::new(ValueKind::Decimal, &other)),
        }
    }
}

impl ColumnType for String {
    fn value_kind() -> ValueKind {
        ValueKind::String
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::String(self.clone())
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::String(s) => Ok(s),
            other => Err(ConversionError::new(ValueKind::String, &other)),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ColumnType for Vec<u8> {
    fn value_kind() -> ValueKind {
        ValueKind::Bytes
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bytes(self.clone())
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Bytes(b) => Ok(b),
            SqlValue::String(s) => Ok(s.into_bytes()),
            other => Err(ConversionError::new(ValueKind::Bytes, &other)),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ColumnType for uuid::Uuid {
    fn value_kind() -> ValueKind {
        ValueKind::Uuid
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Uuid(u) => Ok(u),
            SqlValue::String(ref s) => uuid::Uuid::parse_str(s)
                .map_err(|_| ConversionError::new(ValueKind::Uuid, &value)),
            other => Err(ConversionError::new(ValueKind::Uuid, &other)),
        }
    }
}

impl ColumnType for JsonValue {
    fn value_kind() -> ValueKind {
        ValueKind::Json
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Json(self.clone())
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Json(j) => Ok(j),
            other => Err(ConversionError::new(ValueKind::Json, &other)),
        }
    }
}

impl ColumnType for NaiveDate {
    fn value_kind() -> ValueKind {
        ValueKind::Date
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Date(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Date(d) => Ok(d),
            SqlValue::Timestamp(ts) => Ok(ts.date()),
            other => Err(ConversionError::new(ValueKind::Date, &other)),
        }
    }
}

impl ColumnType for NaiveTime {
    fn value_kind() -> ValueKind {
        ValueKind::Time
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Time(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Time(t) => Ok(t),
            other => Err(ConversionError::new(ValueKind::Time, &other)),
        }
    }
}

impl ColumnType for NaiveDateTime {
    fn value_kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            SqlValue::TimestampTz(ts) => Ok(ts.naive_utc()),
            other => Err(ConversionError::new(ValueKind::Timestamp, &other)),
        }
    }
}

impl ColumnType for DateTime<Utc> {
    fn value_kind() -> ValueKind {
        ValueKind::TimestampTz
    }

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::TimestampTz(*self)
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::TimestampTz(ts) => Ok(ts),
            SqlValue::Timestamp(ts) => Ok(DateTime::<Utc>::from_naive_utc_and_offset(ts, Utc)),
            other => Err(ConversionError::new(ValueKind::TimestampTz, &other)),
        }
    }
}

impl<T: ColumnType> ColumnType for Option<T> {
    fn value_kind() -> ValueKind {
        ValueKind::Option(Box::new(T::value_kind()))
    }

    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some).map_err(|e| ConversionError {
                expected: Self::value_kind(),
                found: e.found,
            }),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widening_and_range() {
        assert_eq!(i64::from_sql_value(SqlValue::Int(5)), Ok(5));
        assert_eq!(u8::from_sql_value(SqlValue::BigInt(200)), Ok(200));
        let err = u8::from_sql_value(SqlValue::BigInt(300)).unwrap_err();
        assert_eq!(err.expected, ValueKind::U8);
        assert_eq!(err.found, "i64");
        assert!(i32::from_sql_value(SqlValue::Double(1.0)).is_err());
        assert!(u32::from_sql_value(SqlValue::Int(-1)).is_err());
    }

    #[test]
    fn test_text_and_binary() {
        assert_eq!(
            String::from_sql_value(SqlValue::from("abc")),
            Ok("abc".to_string())
        );
        assert!(String::from_sql_value(SqlValue::Int(1)).is_err());
        assert_eq!(
            Vec::<u8>::from_sql_value(SqlValue::from("ab")),
            Ok(vec![b'a', b'b'])
        );
    }

    #[test]
    fn test_uuid_from_string() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            uuid::Uuid::from_sql_value(SqlValue::String(id.to_string())),
            Ok(id)
        );
        assert!(uuid::Uuid::from_sql_value(SqlValue::from("not-a-uuid")).is_err());
    }

    #[test]
    fn test_option_accepts_null_and_inner() {
        assert_eq!(Option::<i32>::from_sql_value(SqlValue::Null), Ok(None));
        assert_eq!(
            Option::<i32>::from_sql_value(SqlValue::SmallInt(3)),
            Ok(Some(3))
        );
        let err = Option::<i32>::from_sql_value(SqlValue::from("x")).unwrap_err();
        assert_eq!(err.expected, ValueKind::Option(Box::new(ValueKind::I32)));
        assert!(i32::from_sql_value(SqlValue::Null).is_err());
    }

    #[test]
    fn test_float_from_integer() {
        assert_eq!(f64::from_sql_value(SqlValue::Int(2)), Ok(2.0));
        assert_eq!(f32::from_sql_value(SqlValue::Double(0.5)), Ok(0.5));
    }

    #[test]
    fn test_kind_helpers() {
        let kind = Option::<u16>::value_kind();
        assert!(kind.is_optional());
        assert!(kind.is_integer());
        assert_eq!(kind.base(), &ValueKind::U16);
        assert_eq!(kind.to_string(), "option<u16>");
    }
}
