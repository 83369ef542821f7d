//! Per-dialect SQL text for table-level operations.
//!
//! Every method receives names that are already wrapped / fully qualified by
//! the dialect's [`QuerySyntax`](super::QuerySyntax) and returns SQL text only;
//! nothing here executes. Defaults are ANSI-like and dialects override what
//! differs.

use crate::error::{DialectError, Result};
use crate::schema::TableType;

use super::DatabaseType;

fn null_clause(allow_nulls: bool) -> &'static str {
    if allow_nulls {
        "NULL"
    } else {
        "NOT NULL"
    }
}

/// SQL text for ALTER/RENAME/TRUNCATE and friends.
pub trait TableHelper: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    fn add_column_sql(
        &self,
        table_fqn: &str,
        column: &str,
        data_type: &str,
        allow_nulls: bool,
    ) -> String {
        format!(
            "ALTER TABLE {} ADD {} {} {}",
            table_fqn,
            column,
            data_type,
            null_clause(allow_nulls)
        )
    }

    fn drop_column_sql(&self, table_fqn: &str, column: &str) -> String {
        format!("ALTER TABLE {} DROP COLUMN {}", table_fqn, column)
    }

    /// Statements that change a column's type, executed in order.
    ///
    /// `old_type` is the column's current proprietary type; dialects that
    /// cannot convert some types directly go through an intermediate type.
    fn alter_column_type_sql(
        &self,
        table_fqn: &str,
        column: &str,
        old_type: &str,
        new_type: &str,
        allow_nulls: bool,
    ) -> Result<Vec<String>>;

    /// Rename `old_fqn` to `new_name` (`new_wrapped` is the wrapped simple
    /// name, `new_fqn` the fully qualified one).
    fn rename_table_sql(
        &self,
        old_fqn: &str,
        _new_name: &str,
        new_wrapped: &str,
        _new_fqn: &str,
    ) -> String {
        format!("ALTER TABLE {} RENAME TO {}", old_fqn, new_wrapped)
    }

    fn truncate_sql(&self, table_fqn: &str) -> String {
        format!("TRUNCATE TABLE {}", table_fqn)
    }

    /// Statements that collapse duplicate rows of `table_fqn` using `temp_fqn`
    /// as scratch space. Executed in one transaction.
    fn make_distinct_sql(&self, table_fqn: &str, temp_fqn: &str) -> Vec<String> {
        vec![
            format!("CREATE TABLE {} AS SELECT DISTINCT * FROM {}", temp_fqn, table_fqn),
            format!("DELETE FROM {}", table_fqn),
            format!("INSERT INTO {} SELECT * FROM {}", table_fqn, temp_fqn),
            format!("DROP TABLE {}", temp_fqn),
        ]
    }

    fn row_count_sql(&self, table_fqn: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", table_fqn)
    }

    fn insert_sql(&self, table_fqn: &str, columns: &[String], parameters: &[String]) -> String {
        format!(
            "INSERT INTO {}({}) VALUES ({})",
            table_fqn,
            columns.join(","),
            parameters.join(",")
        )
    }

    /// Query returning the last auto-increment value generated on this
    /// connection, or `None` if the dialect cannot tell.
    fn last_identity_sql(&self, table_fqn: &str, auto_increment_column: Option<&str>) -> Option<String>;

    fn create_primary_key_sql(
        &self,
        table_fqn: &str,
        constraint: &str,
        columns: &[String],
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            table_fqn,
            constraint,
            columns.join(",")
        ))
    }

    /// Foreign key added after the fact (not part of CREATE TABLE).
    fn add_foreign_key_sql(
        &self,
        foreign_fqn: &str,
        constraint: &str,
        foreign_columns: &[String],
        primary_fqn: &str,
        primary_columns: &[String],
        cascade_delete: bool,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            foreign_fqn,
            foreign_key_constraint_sql(
                constraint,
                foreign_columns,
                primary_fqn,
                primary_columns,
                cascade_delete
            )
        ))
    }

    fn drop_table_sql(&self, fqn: &str, table_type: TableType) -> String {
        match table_type {
            TableType::Table => format!("DROP TABLE {}", fqn),
            TableType::View => format!("DROP VIEW {}", fqn),
            TableType::TableValuedFunction => format!("DROP FUNCTION {}", fqn),
        }
    }

    /// Whether auto-increment must be declared inline as the primary key
    /// (suppressing the table-level PRIMARY KEY constraint).
    fn auto_increment_is_inline_primary_key(&self) -> bool {
        false
    }

    /// Type used for an auto-increment column given the requested type.
    fn auto_increment_column_type(&self, requested: &str) -> String {
        requested.to_string()
    }
}

/// `CONSTRAINT name FOREIGN KEY (..) REFERENCES parent(..) [ON DELETE CASCADE]`
pub fn foreign_key_constraint_sql(
    constraint: &str,
    foreign_columns: &[String],
    primary_fqn: &str,
    primary_columns: &[String],
    cascade_delete: bool,
) -> String {
    let mut sql = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
        constraint,
        foreign_columns.join(","),
        primary_fqn,
        primary_columns.join(",")
    );
    if cascade_delete {
        sql.push_str(" ON DELETE CASCADE");
    }
    sql
}

/// ALTER COLUMN for dialects that cannot express it at all.
pub fn alter_not_supported(db: DatabaseType) -> Result<Vec<String>> {
    Err(DialectError::not_supported(db.to_string(), "ALTER COLUMN type change"))
}

/// Shared helper for `ALTER TABLE t <verb> c type NULL|NOT NULL`.
pub fn alter_column_statement(
    table_fqn: &str,
    verb: &str,
    column: &str,
    new_type: &str,
    allow_nulls: bool,
) -> String {
    format!(
        "ALTER TABLE {} {} {} {} {}",
        table_fqn,
        verb,
        column,
        new_type,
        null_clause(allow_nulls)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ansi;

    impl TableHelper for Ansi {
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
            Ok(vec![alter_column_statement(table_fqn, "ALTER COLUMN", column, new_type, allow_nulls)])
        }
        fn last_identity_sql(&self, _: &str, _: Option<&str>) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_make_distinct_default_sequence() {
        let stmts = Ansi.make_distinct_sql("\"t\"", "\"t_DistinctingTemp\"");
        assert_eq!(stmts.len(), 4);
        assert!(stmts[0].starts_with("CREATE TABLE \"t_DistinctingTemp\" AS SELECT DISTINCT *"));
        assert_eq!(stmts[3], "DROP TABLE \"t_DistinctingTemp\"");
    }

    #[test]
    fn test_foreign_key_constraint_cascade() {
        let cols = vec!["\"parent_id\"".to_string()];
        let pk = vec!["\"id\"".to_string()];
        let sql = foreign_key_constraint_sql("FK_c_p", &cols, "\"p\"", &pk, true);
        assert_eq!(
            sql,
            "CONSTRAINT FK_c_p FOREIGN KEY (\"parent_id\") REFERENCES \"p\"(\"id\") ON DELETE CASCADE"
        );
        assert!(!foreign_key_constraint_sql("FK", &cols, "\"p\"", &pk, false).contains("CASCADE"));
    }

    #[test]
    fn test_insert_sql() {
        let sql = Ansi.insert_sql(
            "\"t\"",
            &["\"a\"".to_string(), "\"b\"".to_string()],
            &["@a".to_string(), "@b".to_string()],
        );
        assert_eq!(sql, "INSERT INTO \"t\"(\"a\",\"b\") VALUES (@a,@b)");
    }

    #[test]
    fn test_drop_table_by_type() {
        assert_eq!(Ansi.drop_table_sql("\"v\"", TableType::View), "DROP VIEW \"v\"");
    }
}
