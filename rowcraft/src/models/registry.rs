//! Model metadata engine
//!
//! Turns a [`Reflect`] type description into an [`EntityDescriptor`] and
//! caches the result per type. Extraction is a pure function of the type,
//! so concurrent first extractions of the same type may both compute and
//! both insert; the last insert stays and the results are equivalent.
//!
//! A process-wide registry is available through [`ModelRegistry::global`]
//! and the free functions of this module. Tests that need isolated cache
//! state can construct their own registry with [`ModelRegistry::new`].

use super::descriptor::{EntityDescriptor, FieldDescriptor, ReferenceInfo};
use super::reflect::{MemberShape, MemberType, NestedType, RecordShape, Reflect, TypeShape};
use super::tags::TagSettings;
use crate::database::types::SqlValue;
use crate::error::{Error, Result};
use crate::utils::string::to_snake_case;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL_REGISTRY: Lazy<ModelRegistry> = Lazy::new(ModelRegistry::new);

/// A record handed to [`ModelRegistry::apply_values`]
///
/// Only an exclusive borrow can be written through; a shared borrow is
/// rejected with [`Error::NotAddressable`].
pub enum RecordRef<'a, T> {
    Shared(&'a T),
    Exclusive(&'a mut T),
}

impl<'a, T> From<&'a T> for RecordRef<'a, T> {
    fn from(record: &'a T) -> Self {
        RecordRef::Shared(record)
    }
}

impl<'a, T> From<&'a mut T> for RecordRef<'a, T> {
    fn from(record: &'a mut T) -> Self {
        RecordRef::Exclusive(record)
    }
}

/// Type-keyed cache of entity and field descriptors
#[derive(Default)]
pub struct ModelRegistry {
    entities: RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>,
    fields: RwLock<HashMap<TypeId, Arc<Vec<FieldDescriptor>>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by the free functions
    pub fn global() -> &'static ModelRegistry {
        &GLOBAL_REGISTRY
    }

    /// Describe `T`, building and caching the descriptor on first use
    ///
    /// Fails with [`Error::ModelKind`] when `T` is not a record type.
    pub fn extract<T: Reflect>(&self) -> Result<Arc<EntityDescriptor>> {
        let key = T::type_key();
        let type_name = std::any::type_name::<T>();

        let cached = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(descriptor) = cached {
            log::trace!("Entity cache hit for {}", type_name);
            return Ok(descriptor);
        }

        let record = match T::shape() {
            TypeShape::Record(record) => record,
            TypeShape::Scalar(_) => return Err(Error::model_kind(type_name)),
        };

        let fields = self.fields_of(key, type_name, &record, "")?;
        let descriptor = Arc::new(build_entity(&record, fields));

        log::debug!(
            "Extracted entity {} (table {}, {} fields)",
            descriptor.name,
            descriptor.table,
            descriptor.fields.len()
        );

        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&descriptor));

        Ok(descriptor)
    }

    /// Flattened field list of `T`
    ///
    /// With a non-empty `prefix` the list is being merged into an outer
    /// record, and embedded scalar members are left out.
    pub fn extract_fields<T: Reflect>(&self, prefix: &str) -> Result<Vec<FieldDescriptor>> {
        self.nested_fields(NestedType::of::<T>(), prefix)
    }

    fn nested_fields(&self, nested: NestedType, prefix: &str) -> Result<Vec<FieldDescriptor>> {
        let key = (nested.type_id)();

        let cached = self
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(fields) = cached {
            log::trace!("Field cache hit for {}", nested.type_name);
            return Ok(copy_fields(&fields, prefix));
        }

        match (nested.shape)() {
            TypeShape::Record(record) => self.fields_of(key, nested.type_name, &record, prefix),
            TypeShape::Scalar(_) => Err(Error::model_kind(nested.type_name)),
        }
    }

    fn fields_of(
        &self,
        key: TypeId,
        type_name: &str,
        record: &RecordShape,
        prefix: &str,
    ) -> Result<Vec<FieldDescriptor>> {
        let cached = self
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(fields) = cached {
            log::trace!("Field cache hit for {}", type_name);
            return Ok(copy_fields(&fields, prefix));
        }

        let fields = Arc::new(self.flatten(record, prefix)?);
        log::debug!("Cached {} fields for {}", fields.len(), type_name);

        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&fields));

        Ok(copy_fields(&fields, prefix))
    }

    fn flatten(&self, record: &RecordShape, prefix: &str) -> Result<Vec<FieldDescriptor>> {
        // Names the record declares itself always win over embedded ones
        let own_names: HashSet<&str> = record
            .members
            .iter()
            .filter(|m| is_visible(m) && !is_flattened(m))
            .map(|m| m.name)
            .collect();

        let mut seen: HashSet<String> = HashSet::new();
        let mut fields = Vec::with_capacity(record.members.len());

        for (index, member) in record.members.iter().enumerate() {
            if !is_visible(member) {
                continue;
            }

            if let MemberType::Nested(nested) = &member.ty {
                if member.embedded && (nested.shape)().is_record() {
                    let nested_prefix = if prefix.is_empty() {
                        member.name.to_string()
                    } else {
                        format!("{}.{}", prefix, member.name)
                    };

                    for mut inner in self.nested_fields(*nested, &nested_prefix)? {
                        if own_names.contains(inner.name.as_str()) || seen.contains(&inner.name) {
                            log::trace!(
                                "Dropping embedded field {}.{} shadowed by {}",
                                nested_prefix,
                                inner.name,
                                record.name
                            );
                            continue;
                        }
                        inner.path.insert(0, index);
                        seen.insert(inner.name.clone());
                        fields.push(inner);
                    }
                    continue;
                }
            }

            if seen.insert(member.name.to_string()) {
                fields.push(describe_member(index, member));
            }
        }

        Ok(fields)
    }

    /// Drop every cached descriptor
    pub fn clear_cache(&self) {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        log::debug!("Model metadata cache cleared");
    }

    /// Names of the entities currently cached, sorted
    pub fn cached_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Current values of a record keyed by column name
    ///
    /// Ignored and write-only fields are skipped. When `only` is not empty,
    /// just the fields whose member or column name it lists are returned.
    pub fn field_values<T: Reflect>(
        &self,
        record: &T,
        only: &[&str],
    ) -> Result<IndexMap<String, SqlValue>> {
        let descriptor = self.extract::<T>()?;
        let mut values = IndexMap::new();

        for field in descriptor.fields.values() {
            if !field.is_readable() {
                continue;
            }
            if !only.is_empty()
                && !only
                    .iter()
                    .any(|name| *name == field.name || *name == field.column)
            {
                continue;
            }
            if let Some(value) = record.member_value(&field.path) {
                values.insert(field.column.clone(), value);
            }
        }

        Ok(values)
    }

    /// Write column values into a record
    ///
    /// Unknown columns are skipped, as are ignored and write-only fields.
    /// A value that cannot be converted to the member's type fails with
    /// [`Error::IncompatibleType`]; values applied before it stay applied.
    pub fn apply_values<'a, T, K, I>(&self, target: impl Into<RecordRef<'a, T>>, values: I) -> Result<()>
    where
        T: Reflect + 'a,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, SqlValue)>,
    {
        let descriptor = self.extract::<T>()?;
        let record = match target.into() {
            RecordRef::Exclusive(record) => record,
            RecordRef::Shared(_) => return Err(Error::not_addressable(&descriptor.name)),
        };

        for (column, value) in values {
            let Some(field) = descriptor.field_by_column(column.as_ref()) else {
                continue;
            };
            if field.is_ignored || field.is_write_only || field.value_kind.is_none() {
                continue;
            }

            record
                .set_member_value(&field.path, value)
                .map_err(|e| Error::IncompatibleType {
                    model: descriptor.name.clone(),
                    field: field.name.clone(),
                    expected: e.expected.to_string(),
                    found: e.found.to_string(),
                })?;
        }

        Ok(())
    }

    /// Check not-null fields in declaration order
    ///
    /// Fails with [`Error::NullConstraint`] naming the first not-null field
    /// that holds its type's zero value.
    pub fn validate_not_null<T: Reflect>(&self, record: &T) -> Result<()> {
        let descriptor = self.extract::<T>()?;

        for field in descriptor.fields.values() {
            if field.is_ignored || !field.is_not_null {
                continue;
            }
            if record.member_is_zero(&field.path).unwrap_or(false) {
                return Err(Error::null_constraint(&descriptor.name, &field.name));
            }
        }

        Ok(())
    }
}

fn is_visible(member: &MemberShape) -> bool {
    member.exported || member.embedded
}

fn is_flattened(member: &MemberShape) -> bool {
    member.embedded && matches!(&member.ty, MemberType::Nested(n) if (n.shape)().is_record())
}

fn copy_fields(fields: &[FieldDescriptor], prefix: &str) -> Vec<FieldDescriptor> {
    fields
        .iter()
        .filter(|f| prefix.is_empty() || !f.is_embedded)
        .cloned()
        .collect()
}

fn flag(settings: &TagSettings, names: &[&str]) -> bool {
    names.iter().any(|name| settings.has_flag(name))
}

/// Leading decimal digits of a setting, zero when there are none
fn leading_number(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn parse_reference(settings: &TagSettings) -> Option<ReferenceInfo> {
    let target = settings.value("references")?;
    let parts: Vec<&str> = target.split('.').collect();
    match parts.as_slice() {
        [entity, field] if !entity.is_empty() && !field.is_empty() => Some(ReferenceInfo {
            entity: entity.to_string(),
            field: field.to_string(),
            on_delete: settings.value("onDelete").map(str::to_string),
            on_update: settings.value("onUpdate").map(str::to_string),
        }),
        _ => None,
    }
}

fn describe_member(index: usize, member: &MemberShape) -> FieldDescriptor {
    let raw_tag = member.annotation.unwrap_or_default().to_string();
    let settings = TagSettings::parse(&raw_tag);

    let column = settings
        .value("column")
        .map(str::to_string)
        .unwrap_or_else(|| to_snake_case(member.name));

    let value_kind = match &member.ty {
        MemberType::Value(kind) => Some(kind.clone()),
        MemberType::Nested(nested) => match (nested.shape)() {
            TypeShape::Scalar(kind) => Some(kind),
            TypeShape::Record(_) => None,
        },
        MemberType::Opaque => None,
    };

    let size = settings.get("size").map_or(0, leading_number);
    let (precision, scale) = match settings.get("precision") {
        Some(precision) => (
            leading_number(precision),
            settings.get("scale").map_or(0, leading_number),
        ),
        None => (0, 0),
    };

    FieldDescriptor {
        name: member.name.to_string(),
        column,
        value_kind,
        type_name: member.type_name.to_string(),
        path: vec![index],
        is_primary_key: flag(&settings, &["primaryKey", "primary_key"]),
        is_auto_increment: flag(&settings, &["autoIncrement", "auto_increment"]),
        is_unique: settings.has_flag("unique") || settings.contains_key("uniqueIndex"),
        is_index: settings.contains_key("index"),
        is_not_null: flag(&settings, &["notNull", "not_null"]),
        is_ignored: flag(&settings, &["-", "ignore"]),
        is_read_only: flag(&settings, &["readOnly", "readonly"]),
        is_write_only: flag(&settings, &["writeOnly", "writeonly"]),
        is_embedded: member.embedded,
        size,
        precision,
        scale,
        default: settings.get("default").map(str::to_string),
        reference: parse_reference(&settings),
        raw_tag,
        settings,
    }
}

fn build_entity(record: &RecordShape, fields: Vec<FieldDescriptor>) -> EntityDescriptor {
    let settings = TagSettings::parse(record.annotation.unwrap_or_default());
    let table = settings
        .value("table")
        .map(str::to_string)
        .unwrap_or_else(|| to_snake_case(record.name));

    let mut entity = EntityDescriptor {
        name: record.name.to_string(),
        table,
        fields: IndexMap::with_capacity(fields.len()),
        fields_by_column: IndexMap::with_capacity(fields.len()),
        primary_key: Vec::new(),
        auto_increment: None,
        indexes: IndexMap::new(),
        unique_indexes: IndexMap::new(),
        settings,
    };

    for field in fields {
        if let Some(existing) = entity.fields_by_column.get(&field.column) {
            log::warn!(
                "{}: field {} maps to column {} already used by {}, dropping it",
                entity.name,
                field.name,
                field.column,
                existing.name
            );
            continue;
        }

        if field.is_primary_key {
            entity.primary_key.push(field.name.clone());
        }
        if field.is_auto_increment {
            entity.auto_increment = Some(field.name.clone());
        }
        if field.is_index {
            let name = field
                .settings
                .value("index")
                .map(str::to_string)
                .unwrap_or_else(|| format!("idx_{}_{}", entity.table, field.column));
            entity
                .indexes
                .entry(name)
                .or_default()
                .push(field.column.clone());
        }
        if field.is_unique {
            let name = field
                .settings
                .value("uniqueIndex")
                .map(str::to_string)
                .unwrap_or_else(|| format!("udx_{}_{}", entity.table, field.column));
            entity
                .unique_indexes
                .entry(name)
                .or_default()
                .push(field.column.clone());
        }

        entity
            .fields_by_column
            .insert(field.column.clone(), field.clone());
        entity.fields.insert(field.name.clone(), field);
    }

    entity
}

/// Describe `T` using the global registry
pub fn extract<T: Reflect>() -> Result<Arc<EntityDescriptor>> {
    ModelRegistry::global().extract::<T>()
}

pub fn field_values<T: Reflect>(record: &T, only: &[&str]) -> Result<IndexMap<String, SqlValue>> {
    ModelRegistry::global().field_values(record, only)
}

pub fn apply_values<'a, T, K, I>(target: impl Into<RecordRef<'a, T>>, values: I) -> Result<()>
where
    T: Reflect + 'a,
    K: AsRef<str>,
    I: IntoIterator<Item = (K, SqlValue)>,
{
    ModelRegistry::global().apply_values(target, values)
}

pub fn validate_not_null<T: Reflect>(record: &T) -> Result<()> {
    ModelRegistry::global().validate_not_null(record)
}

/// Drop everything cached by the global registry
pub fn clear_cache() {
    ModelRegistry::global().clear_cache()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::types::{ColumnType, ConversionError, ValueKind};

    // Hand-written description so these tests do not depend on the derive
    struct Account {
        id: i64,
        email: String,
        secret: String,
    }

    fn member(name: &'static str, annotation: &'static str, kind: ValueKind) -> MemberShape {
        MemberShape {
            name,
            annotation: Some(annotation),
            type_name: "",
            exported: true,
            embedded: false,
            ty: MemberType::Value(kind),
        }
    }

    impl Reflect for Account {
        fn shape() -> TypeShape {
            TypeShape::Record(RecordShape {
                name: "Account",
                annotation: Some("table:accounts"),
                members: vec![
                    member("ID", "primaryKey;autoIncrement", ValueKind::I64),
                    member("Email", "notNull;unique;size:255", ValueKind::String),
                    member("Secret", "writeOnly", ValueKind::String),
                ],
            })
        }

        fn member_value(&self, path: &[usize]) -> Option<SqlValue> {
            match path {
                [0] => Some(self.id.into()),
                [1] => Some(self.email.clone().into()),
                [2] => Some(self.secret.clone().into()),
                _ => None,
            }
        }

        fn member_is_zero(&self, path: &[usize]) -> Option<bool> {
            match path {
                [0] => Some(self.id.is_zero()),
                [1] => Some(self.email.is_zero()),
                [2] => Some(self.secret.is_zero()),
                _ => None,
            }
        }

        fn set_member_value(
            &mut self,
            path: &[usize],
            value: SqlValue,
        ) -> std::result::Result<(), ConversionError> {
            match path {
                [0] => self.id = i64::from_sql_value(value)?,
                [1] => self.email = String::from_sql_value(value)?,
                [2] => self.secret = String::from_sql_value(value)?,
                _ => {}
            }
            Ok(())
        }
    }

    fn account() -> Account {
        Account {
            id: 1,
            email: "a@example.com".into(),
            secret: "hunter2".into(),
        }
    }

    #[test]
    fn test_extract_builds_keys_and_indexes() {
        let registry = ModelRegistry::new();
        let entity = registry.extract::<Account>().unwrap();

        assert_eq!(entity.table, "accounts");
        assert_eq!(entity.primary_key, vec!["ID"]);
        assert_eq!(entity.auto_increment.as_deref(), Some("ID"));
        assert_eq!(entity.field("ID").map(|f| f.column.as_str()), Some("id"));
        assert_eq!(
            entity.unique_indexes.get("udx_accounts_email"),
            Some(&vec!["email".to_string()])
        );
        assert_eq!(entity.field("Email").map(|f| f.size), Some(255));
        assert_eq!(registry.cached_types(), vec!["Account"]);
    }

    #[test]
    fn test_scalar_extraction_fails() {
        let registry = ModelRegistry::new();
        let err = registry.extract::<i32>().unwrap_err();
        assert_eq!(err.error_code(), "E_MODEL_KIND");
    }

    #[test]
    fn test_warm_cache_returns_same_descriptor() {
        let registry = ModelRegistry::new();
        let cold = registry.extract::<Account>().unwrap();
        let warm = registry.extract::<Account>().unwrap();
        assert!(Arc::ptr_eq(&cold, &warm));

        registry.clear_cache();
        assert!(registry.cached_types().is_empty());
        let rebuilt = registry.extract::<Account>().unwrap();
        assert_eq!(*rebuilt, *cold);
    }

    #[test]
    fn test_field_values_skip_write_only() {
        let registry = ModelRegistry::new();
        let values = registry.field_values(&account(), &[]).unwrap();
        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["id", "email"]);

        let only = registry.field_values(&account(), &["Email"]).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only.get("email"), Some(&SqlValue::from("a@example.com")));
    }

    #[test]
    fn test_apply_values_requires_exclusive_borrow() {
        let registry = ModelRegistry::new();
        let record = account();
        let err = registry
            .apply_values(&record, [("email", SqlValue::from("b@example.com"))])
            .unwrap_err();
        assert!(matches!(err, Error::NotAddressable { .. }));
    }

    #[test]
    fn test_apply_values_skips_unknown_and_write_only() {
        let registry = ModelRegistry::new();
        let mut record = account();
        registry
            .apply_values(
                &mut record,
                [
                    ("id", SqlValue::Int(7)),
                    ("nickname", SqlValue::from("ignored")),
                    ("secret", SqlValue::from("changed")),
                ],
            )
            .unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.secret, "hunter2");
    }

    #[test]
    fn test_validate_not_null() {
        let registry = ModelRegistry::new();
        let mut record = account();
        assert!(registry.validate_not_null(&record).is_ok());
        record.email.clear();
        let err = registry.validate_not_null(&record).unwrap_err();
        assert!(matches!(
            err,
            Error::NullConstraint { ref field, .. } if field == "Email"
        ));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("255"), 255);
        assert_eq!(leading_number(" 12abc"), 12);
        assert_eq!(leading_number("abc"), 0);
        assert_eq!(leading_number(""), 0);
    }
}
