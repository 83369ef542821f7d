//! PostgreSQL SQL syntax (Strategy pattern).
//!
//! Provides PostgreSQL-specific identifier quoting, qualified names and
//! parameter placeholders.

use crate::dialect::{DatabaseType, QuerySyntax, ScalarFunction};
use crate::error::Result;

/// PostgreSQL syntax implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresSyntax;

impl PostgresSyntax {
    /// Create a new PostgreSQL syntax instance.
    pub fn new() -> Self {
        Self
    }
}

impl QuerySyntax for PostgresSyntax {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn open_quote(&self) -> char {
        '"'
    }

    fn close_quote(&self) -> char {
        '"'
    }

    fn parameter_symbol(&self) -> char {
        ':'
    }

    fn max_database_name_length(&self) -> usize {
        63
    }

    fn max_table_name_length(&self) -> usize {
        63
    }

    fn max_column_name_length(&self) -> usize {
        63
    }

    fn default_schema(&self) -> Option<&str> {
        Some("public")
    }

    fn fully_qualify(&self, database: &str, schema: Option<&str>, table: &str) -> Result<String> {
        let schema = match schema.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => "public",
        };
        let qualified = format!("{}.{}", self.ensure_wrapped(schema)?, self.ensure_wrapped(table)?);
        if database.trim().is_empty() {
            Ok(qualified)
        } else {
            Ok(format!("{}.{}", self.ensure_wrapped(database)?, qualified))
        }
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String {
        match function {
            ScalarFunction::Now => "now()",
            ScalarFunction::NewGuid => "gen_random_uuid()",
            ScalarFunction::Len => "length",
        }
        .to_string()
    }

    fn auto_increment_keyword(&self) -> &str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::verify_alias_contract;

    #[test]
    fn test_quote_escapes_double_quote() {
        let s = PostgresSyntax::new();
        assert_eq!(s.wrap("table\"name").unwrap(), "\"table\"\"name\"");
    }

    #[test]
    fn test_fully_qualify_defaults_to_public() {
        let s = PostgresSyntax::new();
        assert_eq!(
            s.fully_qualify("mydb", None, "users").unwrap(),
            "\"mydb\".\"public\".\"users\""
        );
        assert_eq!(
            s.fully_qualify("mydb", Some("sales"), "users").unwrap(),
            "\"mydb\".\"sales\".\"users\""
        );
    }

    #[test]
    fn test_colon_parameters() {
        let s = PostgresSyntax::new();
        let names = s.parameter_names("SELECT a::int FROM t WHERE b = :b AND c IN (:c1,:c2)");
        let got: Vec<_> = names.into_iter().collect();
        assert_eq!(got, vec![":b", ":c1", ":c2"]);
        assert_eq!(s.parameter_name_for("first name"), ":firstName");
    }

    #[test]
    fn test_alias_contract() {
        verify_alias_contract(&PostgresSyntax::new()).unwrap();
    }
}
