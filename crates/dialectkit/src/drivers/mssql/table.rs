//! MSSQL table-level SQL.

use crate::dialect::{alter_column_statement, DatabaseType, TableHelper};
use crate::error::Result;

/// SQL Server table helper.
#[derive(Debug, Clone, Default)]
pub struct MssqlTableHelper;

impl MssqlTableHelper {
    pub fn new() -> Self {
        Self
    }
}

impl TableHelper for MssqlTableHelper {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    fn alter_column_type_sql(
        &self,
        table_fqn: &str,
        column: &str,
        _old_type: &str,
        new_type: &str,
        allow_nulls: bool,
    ) -> Result<Vec<String>> {
        Ok(vec![alter_column_statement(
            table_fqn,
            "ALTER COLUMN",
            column,
            new_type,
            allow_nulls,
        )])
    }

    fn rename_table_sql(
        &self,
        old_fqn: &str,
        new_name: &str,
        _new_wrapped: &str,
        _new_fqn: &str,
    ) -> String {
        format!(
            "exec sp_rename '{}', '{}'",
            old_fqn.replace('\'', "''"),
            new_name.replace('\'', "''")
        )
    }

    fn make_distinct_sql(&self, table_fqn: &str, temp_fqn: &str) -> Vec<String> {
        vec![
            format!("SELECT DISTINCT * INTO {} FROM {}", temp_fqn, table_fqn),
            format!("DELETE FROM {}", table_fqn),
            format!("INSERT INTO {} SELECT * FROM {}", table_fqn, temp_fqn),
            format!("DROP TABLE {}", temp_fqn),
        ]
    }

    fn last_identity_sql(&self, _table_fqn: &str, _column: Option<&str>) -> Option<String> {
        Some("SELECT SCOPE_IDENTITY()".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alter_column_single_statement() {
        let h = MssqlTableHelper::new();
        let stmts = h
            .alter_column_type_sql("[db]..[t]", "[c]", "bit", "int", true)
            .unwrap();
        assert_eq!(stmts, vec!["ALTER TABLE [db]..[t] ALTER COLUMN [c] int NULL"]);
    }

    #[test]
    fn test_rename_uses_sp_rename() {
        let h = MssqlTableHelper::new();
        assert_eq!(
            h.rename_table_sql("[db]..[old]", "new", "[new]", "[db]..[new]"),
            "exec sp_rename '[db]..[old]', 'new'"
        );
    }

    #[test]
    fn test_make_distinct_uses_select_into() {
        let h = MssqlTableHelper::new();
        let stmts = h.make_distinct_sql("[t]", "[t_DistinctingTemp]");
        assert_eq!(stmts[0], "SELECT DISTINCT * INTO [t_DistinctingTemp] FROM [t]");
    }
}
