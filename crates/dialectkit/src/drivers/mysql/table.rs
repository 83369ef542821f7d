//! MySQL table-level SQL.
//!
//! MySQL cannot widen a `bit` column straight to a numeric or string type;
//! the change has to go through an intermediate `varchar` first.

use crate::core::type_request::TypeKind;
use crate::dialect::{alter_column_statement, DatabaseType, TableHelper, TypeTranslater};
use crate::error::Result;

use super::MysqlTypeTranslater;

/// Width of the intermediate type used when widening a boolean column.
const BOOL_WIDEN_INTERMEDIATE: &str = "varchar(10)";

/// MySQL/MariaDB table helper.
#[derive(Debug, Clone, Default)]
pub struct MysqlTableHelper {
    types: MysqlTypeTranslater,
}

impl MysqlTableHelper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableHelper for MysqlTableHelper {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn alter_column_type_sql(
        &self,
        table_fqn: &str,
        column: &str,
        old_type: &str,
        new_type: &str,
        allow_nulls: bool,
    ) -> Result<Vec<String>> {
        let old_is_bool = self.types.classify(old_type) == Some(TypeKind::Bool);
        let new_is_bool = self.types.classify(new_type) == Some(TypeKind::Bool);

        let mut stmts = Vec::with_capacity(2);
        if old_is_bool && !new_is_bool {
            stmts.push(alter_column_statement(
                table_fqn,
                "MODIFY COLUMN",
                column,
                BOOL_WIDEN_INTERMEDIATE,
                allow_nulls,
            ));
        }
        stmts.push(alter_column_statement(
            table_fqn,
            "MODIFY COLUMN",
            column,
            new_type,
            allow_nulls,
        ));
        Ok(stmts)
    }

    fn rename_table_sql(
        &self,
        old_fqn: &str,
        _new_name: &str,
        _new_wrapped: &str,
        new_fqn: &str,
    ) -> String {
        format!("RENAME TABLE {} TO {}", old_fqn, new_fqn)
    }

    fn last_identity_sql(&self, _table_fqn: &str, _column: Option<&str>) -> Option<String> {
        Some("SELECT LAST_INSERT_ID()".to_string())
    }
}
