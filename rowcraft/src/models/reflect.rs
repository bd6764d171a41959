//! Compile-time type descriptions
//!
//! `#[derive(Entity)]` implements [`Reflect`] for a struct, producing a
//! [`TypeShape`] that lists every member in declaration order together with
//! its annotation and visibility. Members are addressed by positional paths:
//! `[2]` is the third member, `[2, 0]` is the first member of the record
//! embedded as the third member.
//!
//! Scalar column types also implement `Reflect` with a scalar shape, which
//! is how extraction tells records apart from plain values.

use crate::database::types::{ColumnType, ConversionError, SqlValue, ValueKind};
use std::any::TypeId;

/// Description of a type's layout
#[derive(Debug, Clone)]
pub enum TypeShape {
    Record(RecordShape),
    Scalar(ValueKind),
}

impl TypeShape {
    pub fn is_record(&self) -> bool {
        matches!(self, TypeShape::Record(_))
    }
}

/// A struct with named members
#[derive(Debug, Clone)]
pub struct RecordShape {
    pub name: &'static str,
    /// Table-level annotation, e.g. `table:accounts`
    pub annotation: Option<&'static str>,
    pub members: Vec<MemberShape>,
}

#[derive(Debug, Clone)]
pub struct MemberShape {
    pub name: &'static str,
    pub annotation: Option<&'static str>,
    pub type_name: &'static str,
    /// Visible outside the defining module
    pub exported: bool,
    pub embedded: bool,
    pub ty: MemberType,
}

#[derive(Debug, Clone)]
pub enum MemberType {
    /// Column-backed scalar
    Value(ValueKind),
    /// Embedded type whose members may be flattened into the parent
    Nested(NestedType),
    /// Member the engine cannot read or write
    Opaque,
}

/// Lazy handle on an embedded type's description
#[derive(Clone, Copy)]
pub struct NestedType {
    pub type_id: fn() -> TypeId,
    pub type_name: &'static str,
    pub shape: fn() -> TypeShape,
}

impl NestedType {
    pub fn of<T: Reflect>() -> Self {
        Self {
            type_id: T::type_key,
            type_name: std::any::type_name::<T>(),
            shape: T::shape,
        }
    }
}

impl std::fmt::Debug for NestedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedType")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Runtime access to a type's shape and member values
pub trait Reflect: 'static {
    fn shape() -> TypeShape;

    /// Cache identity; wrappers such as `Box<T>` report the inner type
    fn type_key() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Read the member at `path`, or `None` when the path names no value
    fn member_value(&self, path: &[usize]) -> Option<SqlValue>;

    /// Whether the member at `path` holds its type's zero value
    ///
    /// `None` when the path names no value. An `Option` member is zero only
    /// when it is `None`.
    fn member_is_zero(&self, path: &[usize]) -> Option<bool>;

    /// Overwrite the member at `path`
    fn set_member_value(&mut self, path: &[usize], value: SqlValue) -> Result<(), ConversionError>;
}

macro_rules! impl_scalar_reflect {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Scalar(<$ty as ColumnType>::value_kind())
                }

                fn member_value(&self, path: &[usize]) -> Option<SqlValue> {
                    path.is_empty().then(|| ColumnType::to_sql_value(self))
                }

                fn member_is_zero(&self, path: &[usize]) -> Option<bool> {
                    path.is_empty().then(|| ColumnType::is_zero(self))
                }

                fn set_member_value(
                    &mut self,
                    path: &[usize],
                    value: SqlValue,
                ) -> Result<(), ConversionError> {
                    if !path.is_empty() {
                        return Err(ConversionError::new(
                            <$ty as ColumnType>::value_kind(),
                            &value,
                        ));
                    }
                    *self = <$ty as ColumnType>::from_sql_value(value)?;
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar_reflect!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    uuid::Uuid,
    serde_json::Value,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
);

#[cfg(feature = "decimal")]
impl_scalar_reflect!(rust_decimal::Decimal);

impl<T: ColumnType> Reflect for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::Scalar(<Self as ColumnType>::value_kind())
    }

    fn member_value(&self, path: &[usize]) -> Option<SqlValue> {
        path.is_empty().then(|| ColumnType::to_sql_value(self))
    }

    fn member_is_zero(&self, path: &[usize]) -> Option<bool> {
        path.is_empty().then(|| ColumnType::is_zero(self))
    }

    fn set_member_value(&mut self, path: &[usize], value: SqlValue) -> Result<(), ConversionError> {
        if !path.is_empty() {
            return Err(ConversionError::new(
                <Self as ColumnType>::value_kind(),
                &value,
            ));
        }
        *self = <Self as ColumnType>::from_sql_value(value)?;
        Ok(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> TypeShape {
        T::shape()
    }

    fn type_key() -> TypeId {
        T::type_key()
    }

    fn member_value(&self, path: &[usize]) -> Option<SqlValue> {
        self.as_ref().member_value(path)
    }

    fn member_is_zero(&self, path: &[usize]) -> Option<bool> {
        self.as_ref().member_is_zero(path)
    }

    fn set_member_value(&mut self, path: &[usize], value: SqlValue) -> Result<(), ConversionError> {
        self.as_mut().set_member_value(path, value)
    }
}
