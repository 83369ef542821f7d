//! SQLite table-level SQL.
//!
//! SQLite cannot change a column's type, add constraints to an existing
//! table, or truncate; those operations either report `NotSupported` or use
//! the nearest equivalent.

use crate::dialect::{alter_not_supported, DatabaseType, TableHelper};
use crate::error::{DialectError, Result};

/// SQLite table helper.
#[derive(Debug, Clone, Default)]
pub struct SqliteTableHelper;

impl SqliteTableHelper {
    pub fn new() -> Self {
        Self
    }
}

impl TableHelper for SqliteTableHelper {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn alter_column_type_sql(
        &self,
        _table_fqn: &str,
        _column: &str,
        _old_type: &str,
        _new_type: &str,
        _allow_nulls: bool,
    ) -> Result<Vec<String>> {
        alter_not_supported(DatabaseType::Sqlite)
    }

    fn truncate_sql(&self, table_fqn: &str) -> String {
        format!("DELETE FROM {}", table_fqn)
    }

    fn last_identity_sql(&self, _table_fqn: &str, _column: Option<&str>) -> Option<String> {
        Some("SELECT last_insert_rowid()".to_string())
    }

    fn create_primary_key_sql(
        &self,
        _table_fqn: &str,
        _constraint: &str,
        _columns: &[String],
    ) -> Result<String> {
        Err(DialectError::not_supported("sqlite", "ADD PRIMARY KEY on an existing table"))
    }

    fn add_foreign_key_sql(
        &self,
        _foreign_fqn: &str,
        _constraint: &str,
        _foreign_columns: &[String],
        _primary_fqn: &str,
        _primary_columns: &[String],
        _cascade_delete: bool,
    ) -> Result<String> {
        Err(DialectError::not_supported("sqlite", "ADD FOREIGN KEY on an existing table"))
    }

    fn auto_increment_is_inline_primary_key(&self) -> bool {
        true
    }

    // AUTOINCREMENT is only legal on an INTEGER PRIMARY KEY.
    fn auto_increment_column_type(&self, _requested: &str) -> String {
        "INTEGER".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alter_is_not_supported() {
        let err = SqliteTableHelper::new()
            .alter_column_type_sql("\"t\"", "\"c\"", "int", "bigint", true)
            .unwrap_err();
        assert!(matches!(err, DialectError::NotSupported { .. }));
    }

    #[test]
    fn test_truncate_is_delete() {
        assert_eq!(SqliteTableHelper::new().truncate_sql("\"t\""), "DELETE FROM \"t\"");
    }

    #[test]
    fn test_inline_autoincrement() {
        let h = SqliteTableHelper::new();
        assert!(h.auto_increment_is_inline_primary_key());
        assert_eq!(h.auto_increment_column_type("bigint"), "INTEGER");
    }
}
