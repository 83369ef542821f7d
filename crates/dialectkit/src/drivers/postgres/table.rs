//! PostgreSQL table-level SQL.

use crate::dialect::{DatabaseType, TableHelper};
use crate::error::Result;

/// PostgreSQL table helper.
#[derive(Debug, Clone, Default)]
pub struct PostgresTableHelper;

impl PostgresTableHelper {
    pub fn new() -> Self {
        Self
    }
}

impl TableHelper for PostgresTableHelper {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn alter_column_type_sql(
        &self,
        table_fqn: &str,
        column: &str,
        _old_type: &str,
        new_type: &str,
        allow_nulls: bool,
    ) -> Result<Vec<String>> {
        let nullability = if allow_nulls { "DROP NOT NULL" } else { "SET NOT NULL" };
        Ok(vec![format!(
            "ALTER TABLE {t} ALTER COLUMN {c} TYPE {ty}, ALTER COLUMN {c} {n}",
            t = table_fqn,
            c = column,
            ty = new_type,
            n = nullability
        )])
    }

    fn last_identity_sql(&self, _table_fqn: &str, _column: Option<&str>) -> Option<String> {
        Some("SELECT lastval()".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alter_column_type() {
        let h = PostgresTableHelper::new();
        let stmts = h
            .alter_column_type_sql("\"t\"", "\"c\"", "varchar(5)", "varchar(10)", false)
            .unwrap();
        assert_eq!(
            stmts,
            vec!["ALTER TABLE \"t\" ALTER COLUMN \"c\" TYPE varchar(10), ALTER COLUMN \"c\" SET NOT NULL"]
        );
    }

    #[test]
    fn test_rename_is_unqualified() {
        let h = PostgresTableHelper::new();
        assert_eq!(
            h.rename_table_sql("\"db\".\"public\".\"a\"", "b", "\"b\"", "\"db\".\"public\".\"b\""),
            "ALTER TABLE \"db\".\"public\".\"a\" RENAME TO \"b\""
        );
    }
}
