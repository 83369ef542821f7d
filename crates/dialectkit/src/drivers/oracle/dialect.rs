//! Oracle SQL syntax (Strategy pattern).

use crate::dialect::{DatabaseType, QuerySyntax, ScalarFunction, TopN, TopNPlacement};
use crate::error::Result;

/// Oracle syntax implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleSyntax;

impl OracleSyntax {
    pub fn new() -> Self {
        Self
    }
}

impl QuerySyntax for OracleSyntax {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Oracle
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

    // Oracle rejects the AS keyword before table aliases, but accepts it for columns.
    fn alias_prefix(&self) -> &str {
        " AS "
    }

    fn max_database_name_length(&self) -> usize {
        30
    }

    fn max_table_name_length(&self) -> usize {
        30
    }

    fn max_column_name_length(&self) -> usize {
        30
    }

    /// `"db"."table"`; the schema argument is ignored.
    fn fully_qualify(&self, database: &str, _schema: Option<&str>, table: &str) -> Result<String> {
        let table = self.ensure_wrapped(table)?;
        if database.trim().is_empty() {
            Ok(table)
        } else {
            Ok(format!("{}.{}", self.ensure_wrapped(database)?, table))
        }
    }

    fn top_n(&self, n: u64) -> TopN {
        TopN {
            sql: format!("OFFSET 0 ROWS FETCH NEXT {} ROWS ONLY", n),
            placement: TopNPlacement::PostfixQuery,
        }
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String {
        match function {
            ScalarFunction::Now => "CURRENT_TIMESTAMP",
            ScalarFunction::NewGuid => "SYS_GUID()",
            ScalarFunction::Len => "LENGTH",
        }
        .to_string()
    }

    fn auto_increment_keyword(&self) -> &str {
        "GENERATED BY DEFAULT ON NULL AS IDENTITY"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::verify_alias_contract;

    #[test]
    fn test_fully_qualify_ignores_schema() {
        let s = OracleSyntax::new();
        assert_eq!(
            s.fully_qualify("SCOTT", Some("ignored"), "EMP").unwrap(),
            "\"SCOTT\".\"EMP\""
        );
    }

    #[test]
    fn test_fetch_next() {
        let s = OracleSyntax::new();
        assert_eq!(
            s.build_top_n_select("\"T\"", "*", 3),
            "SELECT * FROM \"T\" OFFSET 0 ROWS FETCH NEXT 3 ROWS ONLY"
        );
    }

    #[test]
    fn test_name_length_limit() {
        assert_eq!(OracleSyntax::new().max_table_name_length(), 30);
    }

    #[test]
    fn test_alias_contract() {
        verify_alias_contract(&OracleSyntax::new()).unwrap();
    }
}
