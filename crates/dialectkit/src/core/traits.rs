//! Core traits for database-agnostic schema and data operations.
//!
//! This module defines the execution seams the toolkit calls through:
//!
//! - [`DbConnection`]: A live connection that runs [`Command`]s and transactions
//! - [`SchemaAdapter`]: Lists, describes and drops objects in a real engine
//! - [`DataAdapter`]: Opens connections and performs the physical bulk insert
//! - [`TypeGuesser`]: Infers a [`TypeRequest`] from sampled values
//!
//! The SQL text itself always comes from the dialect strategies in
//! [`crate::dialect`]; adapters only execute it.
//!
//! # Design Patterns
//!
//! - **Strategy**: Adapters and guessers are interchangeable per engine
//! - **Template Method**: Default implementations in traits define algorithm skeletons

use std::collections::BTreeMap;

use crate::error::{DialectError, Result};
use crate::guess::Culture;
use crate::schema::{Relationship, TableType};

use super::type_request::{TypeKind, TypeRequest};
use super::value::SqlValue;

/// Default per-call timeout handed to adapters.
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// A SQL command with mutable text.
///
/// Batch execution reuses one `Command` and swaps its text between batches,
/// so adapters must not cache anything keyed on the command instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub text: String,
    pub params: Vec<(String, SqlValue)>,
    pub timeout_secs: u32,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Bind a named parameter (name including the dialect prefix).
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Replace the command text, dropping any bound parameters.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.params.clear();
    }
}

/// A live connection to a database engine.
pub trait DbConnection: Send {
    /// Execute a statement and return the affected row count.
    fn execute(&mut self, cmd: &Command) -> Result<u64>;

    /// Run a query and return all rows.
    fn query(&mut self, cmd: &Command) -> Result<Vec<Vec<SqlValue>>>;

    /// Run a query and return the first column of the first row.
    fn scalar(&mut self, cmd: &Command) -> Result<SqlValue> {
        Ok(self
            .query(cmd)?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(SqlValue::Null))
    }

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Name of the database this connection is pointed at, if known.
    fn database(&self) -> Option<&str> {
        None
    }
}

/// Column metadata as reported by an engine's catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Proprietary type string, e.g. `varchar(10)` or `decimal(4,1)`.
    pub data_type: String,
    pub allow_nulls: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub collation: Option<String>,
    /// Any further raw attributes the catalog exposes.
    pub attributes: BTreeMap<String, String>,
}

/// Table/view/function entry as reported by an engine's catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub schema: Option<String>,
    pub table_type: TableType,
}

/// Fully resolved location of a table, as adapters need it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRef<'a> {
    pub database: &'a str,
    pub schema: Option<&'a str>,
    pub table: &'a str,
    pub table_type: TableType,
}

/// Lists, describes and drops objects. Metadata SQL is engine-specific and
/// lives entirely behind this trait.
pub trait SchemaAdapter: Send + Sync {
    fn list_databases(&self, conn: &mut dyn DbConnection) -> Result<Vec<String>>;

    fn database_exists(&self, conn: &mut dyn DbConnection, database: &str) -> Result<bool> {
        Ok(self
            .list_databases(conn)?
            .iter()
            .any(|d| d.eq_ignore_ascii_case(database)))
    }

    fn create_database(&self, conn: &mut dyn DbConnection, database: &str) -> Result<()>;

    fn drop_database(&self, conn: &mut dyn DbConnection, database: &str) -> Result<()>;

    fn list_tables(
        &self,
        conn: &mut dyn DbConnection,
        database: &str,
        include_views: bool,
    ) -> Result<Vec<TableInfo>>;

    fn table_exists(&self, conn: &mut dyn DbConnection, table: &TableRef<'_>) -> Result<bool> {
        let include_views = table.table_type != TableType::Table;
        Ok(self
            .list_tables(conn, table.database, include_views)?
            .iter()
            .any(|t| {
                t.name.eq_ignore_ascii_case(table.table)
                    && t.table_type == table.table_type
                    && match (t.schema.as_deref(), table.schema) {
                        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                        _ => true,
                    }
            }))
    }

    fn describe_columns(
        &self,
        conn: &mut dyn DbConnection,
        table: &TableRef<'_>,
    ) -> Result<Vec<ColumnInfo>>;

    fn list_relationships(
        &self,
        conn: &mut dyn DbConnection,
        table: &TableRef<'_>,
    ) -> Result<Vec<Relationship>>;

    fn drop_table(&self, conn: &mut dyn DbConnection, table: &TableRef<'_>) -> Result<()>;
}

/// Rows handed to the physical bulk insert, already in destination column order.
#[derive(Debug, Clone)]
pub struct BulkInsertRequest<'a> {
    /// Fully qualified destination table.
    pub table: &'a str,
    /// Destination column names, unwrapped.
    pub columns: Vec<String>,
    /// Parameterised single-row INSERT the default implementation executes.
    pub insert_sql: String,
    /// Parameter names matching `columns`, with the dialect prefix.
    pub parameter_names: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    pub timeout_secs: u32,
}

/// Opens connections and moves data.
pub trait DataAdapter: Send + Sync {
    /// Open a connection, optionally pointed at a specific database.
    fn open_connection(&self, database: Option<&str>) -> Result<Box<dyn DbConnection>>;

    /// Physically insert the rows of `request`.
    ///
    /// The default executes `insert_sql` once per row on the supplied
    /// connection. Engines with a native bulk path override this.
    fn bulk_insert(&self, conn: &mut dyn DbConnection, request: &BulkInsertRequest<'_>) -> Result<u64> {
        let mut cmd = Command::new(request.insert_sql.clone()).with_timeout(request.timeout_secs);
        let mut affected = 0;
        for row in &request.rows {
            cmd.params = request
                .parameter_names
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            affected += conn.execute(&cmd)?;
        }
        Ok(affected)
    }

    /// Best-effort row-level diagnosis after `bulk_insert` failed.
    ///
    /// Returns a description of the offending row/column/value if one was
    /// found. The default does no investigation.
    fn investigate_bulk_failure(
        &self,
        _conn: &mut dyn DbConnection,
        _request: &BulkInsertRequest<'_>,
        _error: &DialectError,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Whether `error` means the server was too slow rather than that it
    /// rejected the request.
    fn is_timeout(&self, error: &DialectError) -> bool;
}

/// Settings a guesser needs from the dialect and caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessSettings {
    /// Extra width to reserve for each non-ASCII character in a string.
    pub extra_length_per_non_ascii: u32,
    pub culture: Culture,
}

impl Default for GuessSettings {
    fn default() -> Self {
        Self {
            extra_length_per_non_ascii: 0,
            culture: Culture::default(),
        }
    }
}

/// Infers portable types from sampled values.
pub trait TypeGuesser: Send + Sync {
    /// The narrowest request able to hold `value`, or `None` for NULL/blank.
    fn guess_value(&self, value: &SqlValue, settings: &GuessSettings) -> Option<TypeRequest>;

    /// Widen `current` so it also admits `value`.
    fn widen(&self, current: Option<TypeRequest>, value: &SqlValue, settings: &GuessSettings) -> Option<TypeRequest> {
        match (current, self.guess_value(value, settings)) {
            (Some(c), Some(v)) => Some(TypeRequest::widen(&c, &v)),
            (c, v) => c.or(v),
        }
    }

    /// Guess a type for a whole column. All-null columns come back as `None`.
    fn guess_column<'v>(
        &self,
        values: &mut dyn Iterator<Item = &'v SqlValue>,
        settings: &GuessSettings,
    ) -> Option<TypeRequest> {
        values
            .fold(None, |acc, v| self.widen(acc, v, settings))
            .map(|r| self.finish(r))
    }

    /// Final clean-up of a column guess. The default drops digit counts that
    /// integer guesses carried while widening.
    fn finish(&self, mut request: TypeRequest) -> TypeRequest {
        if request.kind != TypeKind::Decimal {
            request.decimal_size = None;
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KindOnly;

    impl TypeGuesser for KindOnly {
        fn guess_value(&self, value: &SqlValue, _: &GuessSettings) -> Option<TypeRequest> {
            value.type_kind().map(TypeRequest::new)
        }
    }

    #[test]
    fn test_command_set_text_clears_params() {
        let mut cmd = Command::new("INSERT INTO t VALUES (@a)").bind("@a", 1i32);
        assert_eq!(cmd.params.len(), 1);
        cmd.set_text("SELECT 1");
        assert!(cmd.params.is_empty());
        assert_eq!(cmd.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_guess_column_template_widens() {
        let values = [SqlValue::I16(1), SqlValue::Null, SqlValue::I64(9)];
        let guessed = KindOnly
            .guess_column(&mut values.iter(), &GuessSettings::default())
            .unwrap();
        assert_eq!(guessed.kind, TypeKind::Int64);
    }

    #[test]
    fn test_guess_column_all_null() {
        let values = [SqlValue::Null, SqlValue::Null];
        assert!(KindOnly
            .guess_column(&mut values.iter(), &GuessSettings::default())
            .is_none());
    }
}
