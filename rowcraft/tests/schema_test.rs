#[cfg(test)]
mod tests {
    use rowcraft::models::query_builder::{create_index_statements, DatabaseBackend, SqlBuilder};
    use rowcraft::prelude::*;
    use rust_decimal::Decimal;

    #[derive(Entity, Default)]
    #[rowcraft("table:members")]
    pub struct Member {
        #[rowcraft("primaryKey;autoIncrement")]
        pub id: i64,
        #[rowcraft("notNull;size:120")]
        pub name: String,
        #[rowcraft("unique")]
        pub email: Option<String>,
        #[rowcraft("default:TRUE")]
        pub active: bool,
        #[rowcraft("ignore")]
        pub scratch: Vec<String>,
    }

    #[derive(Entity, Default)]
    pub struct Invoice {
        #[rowcraft("primaryKey")]
        pub id: i64,
        #[rowcraft("notNull;references:Member.id;onDelete:CASCADE;onUpdate:RESTRICT;index")]
        pub member_id: i64,
        #[rowcraft("precision:10;scale:2;default:0")]
        pub total: Decimal,
    }

    #[test]
    fn test_postgres_table_from_entity() {
        let mut sql = SqlBuilder::postgres();
        sql.create_table_for::<Member>(true).unwrap();
        assert_eq!(
            sql.sql(),
            "CREATE TABLE IF NOT EXISTS \"members\" (\"id\" BIGSERIAL NOT NULL, \
             \"name\" VARCHAR(120) NOT NULL, \"email\" TEXT, \"active\" BOOLEAN DEFAULT TRUE, \
             PRIMARY KEY (\"id\"), CONSTRAINT \"udx_members_email\" UNIQUE (\"email\"))"
        );
    }

    #[test]
    fn test_mysql_auto_increment() {
        let mut sql = SqlBuilder::mysql();
        sql.create_table_for::<Member>(false).unwrap();
        assert!(sql
            .sql()
            .starts_with("CREATE TABLE `members` (`id` BIGINT NOT NULL AUTO_INCREMENT, `name` VARCHAR(120) NOT NULL"));
        assert!(sql.sql().contains("PRIMARY KEY (`id`)"));
    }

    #[test]
    fn test_sqlite_inline_primary_key() {
        let mut sql = SqlBuilder::sqlite();
        sql.create_table_for::<Member>(false).unwrap();
        assert!(sql
            .sql()
            .starts_with("CREATE TABLE \"members\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT NOT NULL"));
        assert!(!sql.sql().contains("PRIMARY KEY (\"id\")"));
        assert!(!sql.sql().contains("scratch"));
    }

    #[test]
    fn test_foreign_keys_and_decimals() {
        let mut sql = SqlBuilder::postgres();
        sql.create_table_for::<Invoice>(false).unwrap();
        assert_eq!(
            sql.sql(),
            "CREATE TABLE \"invoice\" (\"id\" BIGINT NOT NULL, \"member_id\" BIGINT NOT NULL, \
             \"total\" DECIMAL(10,2) DEFAULT 0, PRIMARY KEY (\"id\"), \
             CONSTRAINT \"fk_invoice_member_id\" FOREIGN KEY (\"member_id\") REFERENCES \"member\"(\"id\") \
             ON DELETE CASCADE ON UPDATE RESTRICT)"
        );
    }

    #[test]
    fn test_index_statements() {
        let entity = Invoice::descriptor().unwrap();
        let statements = create_index_statements(DatabaseBackend::MySQL, &entity);
        assert_eq!(
            statements,
            vec!["CREATE INDEX `idx_invoice_member_id` ON `invoice` (`member_id`)".to_string()]
        );
    }

    #[test]
    fn test_table_from_injected_registry() {
        let registry = ModelRegistry::new();
        let mut sql = SqlBuilder::sqlite();
        sql.create_table_with::<Invoice>(&registry, false).unwrap();

        assert!(sql.sql().starts_with("CREATE TABLE \"invoice\" (\"id\" INTEGER NOT NULL"));
        assert_eq!(registry.cached_types(), vec!["Invoice"]);
    }

    #[test]
    fn test_scalar_type_cannot_make_a_table() {
        let mut sql = SqlBuilder::postgres();
        assert!(sql.create_table_for::<u32>(false).is_err());
    }
}
