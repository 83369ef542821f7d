//! MSSQL SQL syntax (Strategy pattern).
//!
//! Provides MSSQL-specific identifier quoting, qualified names, parameter
//! syntax and row limiting.

use crate::dialect::{DatabaseType, QuerySyntax, ScalarFunction, TopN, TopNPlacement};
use crate::error::Result;

/// Microsoft SQL Server syntax implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlSyntax;

impl MssqlSyntax {
    /// Create a new MSSQL syntax instance.
    pub fn new() -> Self {
        Self
    }
}

impl QuerySyntax for MssqlSyntax {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    fn max_database_name_length(&self) -> usize {
        128
    }

    fn max_table_name_length(&self) -> usize {
        128
    }

    fn max_column_name_length(&self) -> usize {
        128
    }

    fn default_schema(&self) -> Option<&str> {
        Some("dbo")
    }

    fn fully_qualify(&self, database: &str, schema: Option<&str>, table: &str) -> Result<String> {
        let table = self.ensure_wrapped(table)?;
        let schema = match schema.map(str::trim) {
            Some(s) if !s.is_empty() => self.ensure_wrapped(s)?,
            _ => String::new(),
        };
        if database.trim().is_empty() {
            return Ok(if schema.is_empty() {
                table
            } else {
                format!("{}.{}", schema, table)
            });
        }
        // An empty schema means "the user's default schema": [db]..[table]
        Ok(format!("{}.{}.{}", self.ensure_wrapped(database)?, schema, table))
    }

    fn top_n(&self, n: u64) -> TopN {
        TopN {
            sql: format!("TOP {}", n),
            placement: TopNPlacement::PrefixSelectList,
        }
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String {
        match function {
            ScalarFunction::Now => "GETDATE()",
            ScalarFunction::NewGuid => "NEWID()",
            ScalarFunction::Len => "LEN",
        }
        .to_string()
    }

    fn auto_increment_keyword(&self) -> &str {
        "IDENTITY(1,1)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::verify_alias_contract;

    #[test]
    fn test_wrap_escapes_bracket() {
        let s = MssqlSyntax::new();
        assert_eq!(s.wrap("users").unwrap(), "[users]");
        assert_eq!(s.wrap("table]name").unwrap(), "[table]]name]");
    }

    #[test]
    fn test_fully_qualify_forms() {
        let s = MssqlSyntax::new();
        assert_eq!(
            s.fully_qualify("mydb", Some("dbo"), "Users").unwrap(),
            "[mydb].[dbo].[Users]"
        );
        assert_eq!(s.fully_qualify("mydb", None, "Users").unwrap(), "[mydb]..[Users]");
        assert_eq!(s.fully_qualify("mydb", Some(""), "Users").unwrap(), "[mydb]..[Users]");
        assert_eq!(
            s.fully_qualify_column("mydb", None, "Users", "Id").unwrap(),
            "[mydb]..[Users].[Id]"
        );
    }

    #[test]
    fn test_function_column_not_database_qualified() {
        let s = MssqlSyntax::new();
        assert_eq!(
            s.fully_qualify_function_column("MyFunc", "col").unwrap(),
            "[MyFunc].[col]"
        );
    }

    #[test]
    fn test_top_n_prefix() {
        let s = MssqlSyntax::new();
        assert_eq!(s.build_top_n_select("[t]", "*", 10), "SELECT TOP 10 * FROM [t]");
    }

    #[test]
    fn test_parameters_use_at() {
        let s = MssqlSyntax::new();
        assert_eq!(s.parameter_name_for("date of birth"), "@dateOfBirth");
        assert!(s.parameter_names("WHERE x = :y").is_empty());
    }

    #[test]
    fn test_alias_contract() {
        verify_alias_contract(&MssqlSyntax::new()).unwrap();
    }
}
