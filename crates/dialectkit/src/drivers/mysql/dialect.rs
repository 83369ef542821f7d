//! MySQL/MariaDB SQL syntax (Strategy pattern).
//!
//! Provides MySQL-specific identifier quoting, qualified names and row
//! limiting. MySQL has no schema level between database and table.

use crate::dialect::{DatabaseType, QuerySyntax, ScalarFunction};
use crate::error::Result;

/// MySQL/MariaDB syntax implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlSyntax;

impl MysqlSyntax {
    /// Create a new MySQL syntax instance.
    pub fn new() -> Self {
        Self
    }
}

impl QuerySyntax for MysqlSyntax {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    fn max_database_name_length(&self) -> usize {
        64
    }

    fn max_table_name_length(&self) -> usize {
        64
    }

    fn max_column_name_length(&self) -> usize {
        64
    }

    fn fully_qualify(&self, database: &str, _schema: Option<&str>, table: &str) -> Result<String> {
        let table = self.ensure_wrapped(table)?;
        if database.trim().is_empty() {
            Ok(table)
        } else {
            Ok(format!("{}.{}", self.ensure_wrapped(database)?, table))
        }
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String {
        match function {
            ScalarFunction::Now => "now()",
            ScalarFunction::NewGuid => "(uuid())",
            ScalarFunction::Len => "LENGTH",
        }
        .to_string()
    }

    fn auto_increment_keyword(&self) -> &str {
        "AUTO_INCREMENT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::verify_alias_contract;

    #[test]
    fn test_wrap_escapes_backtick() {
        let s = MysqlSyntax::new();
        assert_eq!(s.wrap("users").unwrap(), "`users`");
        assert_eq!(s.wrap("table`name").unwrap(), "`table``name`");
        assert_eq!(s.unwrap("`table``name`"), "table`name");
    }

    #[test]
    fn test_fully_qualify_ignores_schema() {
        let s = MysqlSyntax::new();
        assert_eq!(
            s.fully_qualify("mydb", Some("ignored"), "users").unwrap(),
            "`mydb`.`users`"
        );
        assert_eq!(s.get_runtime_name("`mydb`.`users`"), "users");
    }

    #[test]
    fn test_top_n_postfix() {
        let s = MysqlSyntax::new();
        assert_eq!(s.build_top_n_select("`t`", "*", 3), "SELECT * FROM `t` LIMIT 3");
    }

    #[test]
    fn test_alias_contract() {
        verify_alias_contract(&MysqlSyntax::new()).unwrap();
    }
}
