//! Oracle table-level SQL.

use crate::dialect::{alter_column_statement, DatabaseType, TableHelper};
use crate::error::Result;

/// Oracle table helper.
#[derive(Debug, Clone, Default)]
pub struct OracleTableHelper;

impl OracleTableHelper {
    pub fn new() -> Self {
        Self
    }
}

impl TableHelper for OracleTableHelper {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Oracle
    }

    fn alter_column_type_sql(
        &self,
        table_fqn: &str,
        column: &str,
        _old_type: &str,
        new_type: &str,
        allow_nulls: bool,
    ) -> Result<Vec<String>> {
        Ok(vec![alter_column_statement(table_fqn, "MODIFY", column, new_type, allow_nulls)])
    }

    // No session-scoped identity function; the highest value is the best available answer.
    fn last_identity_sql(&self, table_fqn: &str, auto_increment_column: Option<&str>) -> Option<String> {
        auto_increment_column.map(|c| format!("SELECT MAX({}) FROM {}", c, table_fqn))
    }
}
