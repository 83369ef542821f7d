//! SQLite SQL syntax (Strategy pattern).

use crate::dialect::{DatabaseType, QuerySyntax, ScalarFunction};
use crate::error::Result;

/// SQLite syntax implementation.
#[derive(Debug, Clone, Default)]
pub struct SqliteSyntax;

impl SqliteSyntax {
    pub fn new() -> Self {
        Self
    }
}

impl QuerySyntax for SqliteSyntax {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn open_quote(&self) -> char {
        '"'
    }

    fn close_quote(&self) -> char {
        '"'
    }

    fn max_database_name_length(&self) -> usize {
        usize::MAX
    }

    fn max_table_name_length(&self) -> usize {
        usize::MAX
    }

    fn max_column_name_length(&self) -> usize {
        usize::MAX
    }

    /// Tables are never database-qualified: a `REFERENCES` clause rejects
    /// qualified names and every connection has exactly one `main`.
    fn fully_qualify(&self, _database: &str, _schema: Option<&str>, table: &str) -> Result<String> {
        self.ensure_wrapped(table)
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String {
        match function {
            ScalarFunction::Now => "CURRENT_TIMESTAMP",
            ScalarFunction::NewGuid => "(lower(hex(randomblob(16))))",
            ScalarFunction::Len => "length",
        }
        .to_string()
    }

    fn auto_increment_keyword(&self) -> &str {
        "PRIMARY KEY AUTOINCREMENT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::verify_alias_contract;

    #[test]
    fn test_fully_qualify_is_table_only() {
        let s = SqliteSyntax::new();
        assert_eq!(s.fully_qualify("main", None, "people").unwrap(), "\"people\"");
        assert_eq!(
            s.fully_qualify_column("main", None, "people", "name").unwrap(),
            "\"people\".\"name\""
        );
    }

    #[test]
    fn test_at_parameters() {
        let s = SqliteSyntax::new();
        assert_eq!(s.parameter_name_for("date of birth"), "@dateOfBirth");
    }

    #[test]
    fn test_alias_contract() {
        verify_alias_contract(&SqliteSyntax::new()).unwrap();
    }
}
