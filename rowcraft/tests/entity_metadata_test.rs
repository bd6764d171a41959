#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rowcraft::prelude::*;
    use rowcraft::{TypeShape, ValueKind};
    use std::sync::Arc;

    #[derive(Entity, Default, Debug)]
    pub struct Audit {
        #[rowcraft("readOnly")]
        pub created_at: Option<chrono::NaiveDateTime>,
        // Shadowed by Customer::name
        pub name: String,
    }

    #[derive(Entity, Default, Debug)]
    #[rowcraft("table:customers")]
    pub struct Customer {
        #[rowcraft("primaryKey;autoIncrement")]
        pub id: i64,
        #[rowcraft("notNull;size:120")]
        pub name: String,
        #[rowcraft("column:mail", "uniqueIndex:udx_customers_mail")]
        pub email: Option<String>,
        #[rowcraft(embedded)]
        pub audit: Audit,
        #[rowcraft("-")]
        pub cache: Vec<String>,
        #[rowcraft("writeOnly")]
        pub password: String,
        internal: u32,
    }

    #[derive(Entity, Default)]
    pub struct Order {
        #[rowcraft("primaryKey")]
        pub id: i64,
        #[rowcraft("notNull;references:Customer.id;onDelete:CASCADE;index:idx_orders_customer")]
        pub customer_id: i64,
        #[rowcraft(" size : abc ;; references:Broken ; precision:10;scale:x")]
        pub note: String,
    }

    #[derive(Entity, Default)]
    pub struct Stock {
        #[rowcraft("primaryKey")]
        pub id: i64,
        #[rowcraft("notNull")]
        pub quantity: Option<i32>,
        #[rowcraft("notNull")]
        pub active: Option<bool>,
    }

    #[derive(Entity, Default)]
    pub struct Billing {
        pub name: String,
        pub city: String,
    }

    #[derive(Entity, Default)]
    pub struct Shipping {
        pub name: String,
        pub zip: String,
    }

    #[derive(Entity, Default)]
    pub struct Shipment {
        #[rowcraft(embedded)]
        pub billing: Billing,
        #[rowcraft(embedded)]
        pub shipping: Shipping,
        pub id: i64,
    }

    #[derive(Entity, Default)]
    pub struct Ledger {
        #[rowcraft("column:code")]
        pub code: String,
        #[rowcraft("column:code")]
        pub legacy_code: String,
        pub amount: i64,
    }

    fn customer() -> Customer {
        Customer {
            id: 3,
            name: "Ada".into(),
            email: None,
            audit: Audit::default(),
            cache: vec!["scratch".into()],
            password: "secret".into(),
            internal: 9,
        }
    }

    #[test]
    fn test_descriptor_layout() {
        let entity = Customer::descriptor().unwrap();

        assert_eq!(entity.table, "customers");
        assert_eq!(
            entity.fields.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["id", "name", "email", "created_at", "cache", "password"]
        );
        assert_eq!(
            entity.columns(),
            vec!["id", "name", "mail", "created_at", "cache", "password"]
        );
        assert_eq!(entity.primary_key_columns(), vec!["id"]);
        assert_eq!(entity.auto_increment.as_deref(), Some("id"));
        assert_eq!(
            entity.unique_indexes.get("udx_customers_mail"),
            Some(&vec!["mail".to_string()])
        );
        assert!(entity.field("internal").is_none());
        assert!(entity.field("cache").unwrap().is_ignored);
        assert_eq!(entity.field("name").unwrap().size, 120);
    }

    #[test]
    fn test_embedded_members_flatten_with_paths() {
        let entity = Customer::descriptor().unwrap();

        let created = entity.field("created_at").unwrap();
        assert_eq!(created.path, vec![3, 0]);
        assert!(created.is_read_only);
        assert_eq!(
            created.value_kind,
            Some(ValueKind::Option(Box::new(ValueKind::Timestamp)))
        );

        // The outer record's own member wins over the embedded one
        let name = entity.field("name").unwrap();
        assert_eq!(name.path, vec![1]);
        assert!(name.is_not_null);
    }

    #[test]
    fn test_cold_and_warm_extraction_agree() {
        let registry = ModelRegistry::new();
        let cold = registry.extract::<Customer>().unwrap();
        let warm = registry.extract::<Customer>().unwrap();
        assert!(Arc::ptr_eq(&cold, &warm));

        registry.clear_cache();
        let rebuilt = registry.extract::<Customer>().unwrap();
        assert_eq!(*rebuilt, *cold);
    }

    #[test]
    fn test_boxed_record_shares_cache_entry() {
        let registry = ModelRegistry::new();
        let direct = registry.extract::<Order>().unwrap();
        let boxed = registry.extract::<Box<Order>>().unwrap();
        assert!(Arc::ptr_eq(&direct, &boxed));
    }

    #[test]
    fn test_scalar_is_not_an_entity() {
        assert!(matches!(<i64 as Reflect>::shape(), TypeShape::Scalar(_)));
        let err = rowcraft::extract::<String>().unwrap_err();
        assert!(matches!(err, Error::ModelKind { .. }));
    }

    #[test]
    fn test_lenient_annotations() {
        let entity = Order::descriptor().unwrap();
        assert_eq!(entity.table, "order");

        let note = entity.field("note").unwrap();
        assert_eq!(note.size, 0);
        assert_eq!(note.precision, 10);
        assert_eq!(note.scale, 0);
        assert!(note.reference.is_none());

        let customer_id = entity.field("customer_id").unwrap();
        let reference = customer_id.reference.as_ref().unwrap();
        assert_eq!(reference.entity, "Customer");
        assert_eq!(reference.field, "id");
        assert_eq!(reference.on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(reference.on_update, None);
        assert_eq!(
            entity.indexes.get("idx_orders_customer"),
            Some(&vec!["customer_id".to_string()])
        );
    }

    #[test]
    fn test_field_values_skip_ignored_and_write_only() {
        let record = customer();
        let values = record.field_values(&[]).unwrap();
        assert_eq!(
            values.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["id", "name", "mail", "created_at"]
        );
        assert_eq!(values.get("id"), Some(&SqlValue::BigInt(3)));
        assert_eq!(values.get("mail"), Some(&SqlValue::Null));

        let only = record.field_values(&["name", "mail"]).unwrap();
        assert_eq!(only.len(), 2);
        assert_eq!(only.get("name"), Some(&SqlValue::from("Ada")));
    }

    #[test]
    fn test_apply_values_through_embedded_path() {
        let mut record = customer();
        let created = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        record
            .apply_values([
                ("mail", SqlValue::from("ada@example.com")),
                ("created_at", SqlValue::Timestamp(created)),
                ("password", SqlValue::from("leaked")),
                ("unknown_column", SqlValue::Int(1)),
                ("id", SqlValue::Int(42)),
            ])
            .unwrap();

        assert_eq!(record.email.as_deref(), Some("ada@example.com"));
        assert_eq!(record.audit.created_at, Some(created));
        assert_eq!(record.password, "secret");
        assert_eq!(record.id, 42);
        assert_eq!(record.internal, 9);
    }

    #[test]
    fn test_apply_values_rejects_shared_borrow() {
        let record = customer();
        let err = rowcraft::apply_values(&record, [("name", SqlValue::from("Bob"))]).unwrap_err();
        assert_eq!(err.error_code(), "E_NOT_ADDRESSABLE");
        assert_eq!(record.name, "Ada");
    }

    #[test]
    fn test_apply_values_incompatible_type() {
        let mut record = customer();
        let err = record
            .apply_values([("id", SqlValue::from("not a number"))])
            .unwrap_err();
        match err {
            Error::IncompatibleType {
                model,
                field,
                expected,
                found,
            } => {
                assert_eq!(model, "Customer");
                assert_eq!(field, "id");
                assert_eq!(expected, "i64");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(record.id, 3);
    }

    #[test]
    fn test_validate_not_null() {
        let mut record = customer();
        assert!(record.validate().is_ok());

        record.name.clear();
        let err = record.validate().unwrap_err();
        assert!(matches!(err, Error::NullConstraint { ref field, .. } if field == "name"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_optional_not_null_accepts_some_zero() {
        let mut stock = Stock {
            id: 1,
            quantity: Some(0),
            active: Some(false),
        };
        assert!(stock.validate().is_ok());

        stock.active = None;
        let err = stock.validate().unwrap_err();
        assert!(matches!(err, Error::NullConstraint { ref field, .. } if field == "active"));

        stock.quantity = None;
        let err = stock.validate().unwrap_err();
        assert!(matches!(err, Error::NullConstraint { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn test_first_embedded_record_wins_name_clash() {
        let entity = Shipment::descriptor().unwrap();
        assert_eq!(
            entity.fields.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["name", "city", "zip", "id"]
        );
        assert_eq!(entity.field("name").unwrap().path, vec![0, 0]);
        assert_eq!(entity.field("zip").unwrap().path, vec![1, 1]);

        let shipment = Shipment {
            billing: Billing {
                name: "Ada".into(),
                city: "London".into(),
            },
            shipping: Shipping {
                name: "Bob".into(),
                zip: "N1".into(),
            },
            id: 7,
        };
        let values = shipment.field_values(&["name"]).unwrap();
        assert_eq!(values.get("name"), Some(&SqlValue::from("Ada")));
    }

    #[test]
    fn test_duplicate_column_keeps_first_field() {
        let entity = Ledger::descriptor().unwrap();
        assert_eq!(entity.columns(), vec!["code", "amount"]);
        assert_eq!(entity.field_by_column("code").unwrap().name, "code");
        assert!(entity.field("legacy_code").is_none());

        let ledger = Ledger {
            code: "A1".into(),
            legacy_code: "OLD".into(),
            amount: 5,
        };
        let values = ledger.field_values(&[]).unwrap();
        assert_eq!(values.get("code"), Some(&SqlValue::from("A1")));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_concurrent_first_extraction() {
        let registry = Arc::new(ModelRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.extract::<Customer>().unwrap())
            })
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for descriptor in &descriptors[1..] {
            assert_eq!(**descriptor, *descriptors[0]);
        }
        assert_eq!(registry.cached_types(), vec!["Customer"]);

        let warm = registry.extract::<Customer>().unwrap();
        assert_eq!(*warm, *descriptors[0]);
    }
}
