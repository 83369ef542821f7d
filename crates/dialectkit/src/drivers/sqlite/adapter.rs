//! `rusqlite`-backed schema and data adapters.
//!
//! Metadata comes from `sqlite_master` and the `pragma_*` table-valued
//! functions, so every catalog query is a plain parameterised SELECT that
//! goes through [`DbConnection`] like any other command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, ErrorCode, Statement};
use tracing::{debug, info};

use crate::core::identifier::{foreign_key_constraint_name, quote_with};
use crate::core::keywords::{KeywordAccumulator, KeywordPriority, KeywordRegistry};
use crate::core::traits::{
    BulkInsertRequest, ColumnInfo, Command, DataAdapter, DbConnection, SchemaAdapter, TableInfo,
    TableRef,
};
use crate::core::value::SqlValue;
use crate::dialect::{DatabaseType, TableHelper};
use crate::error::{DialectError, Result};
use crate::schema::{CascadeRule, Relationship, TableType};

use super::{SqliteTableHelper, MAIN_DATABASE};

const DIAGNOSTIC_SAVEPOINT: &str = "dialectkit_bulk";

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(*b as i64),
        SqlValue::U8(v) => Value::Integer(*v as i64),
        SqlValue::I16(v) => Value::Integer(*v as i64),
        SqlValue::I32(v) => Value::Integer(*v as i64),
        SqlValue::I64(v) => Value::Integer(*v),
        SqlValue::F64(v) => Value::Real(*v),
        SqlValue::Decimal(d) => Value::Text(d.to_string()),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bytes(b) => Value::Blob(b.clone()),
        SqlValue::Uuid(u) => Value::Text(u.to_string()),
        SqlValue::DateTime(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        SqlValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        SqlValue::Time(t) => Value::Text(t.format("%H:%M:%S%.f").to_string()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::I64(i),
        ValueRef::Real(f) => SqlValue::F64(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Bytes(b.to_vec()),
    }
}

fn text_at(row: &[SqlValue], index: usize) -> String {
    match row.get(index) {
        Some(SqlValue::Text(s)) => s.clone(),
        Some(SqlValue::I64(i)) => i.to_string(),
        _ => String::new(),
    }
}

fn int_at(row: &[SqlValue], index: usize) -> i64 {
    row.get(index).and_then(SqlValue::as_i64).unwrap_or(0)
}

// =============================================================================
// Connection
// =============================================================================

/// A single SQLite connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Open `path` and apply `keywords` as PRAGMAs.
    pub fn open(path: &Path, keywords: &KeywordAccumulator) -> Result<Self> {
        let conn = Connection::open(path).map_err(DialectError::adapter)?;
        for keyword in keywords.iter() {
            if !keyword.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(DialectError::Config(format!(
                    "Invalid SQLite connection keyword '{}'",
                    keyword.name
                )));
            }
            conn.pragma_update(None, &keyword.name, &keyword.value)
                .map_err(DialectError::adapter)?;
            debug!("Applied PRAGMA {} = {}", keyword.name, keyword.value);
        }
        Ok(Self { conn })
    }

    fn prepare(&self, cmd: &Command) -> Result<Statement<'_>> {
        self.conn
            .busy_timeout(Duration::from_secs(u64::from(cmd.timeout_secs)))
            .map_err(DialectError::adapter)?;
        let mut stmt = self.conn.prepare(&cmd.text).map_err(DialectError::adapter)?;
        for (name, value) in &cmd.params {
            if let Some(index) = stmt.parameter_index(name).map_err(DialectError::adapter)? {
                stmt.raw_bind_parameter(index, to_sqlite(value))
                    .map_err(DialectError::adapter)?;
            }
        }
        Ok(stmt)
    }

    fn execute_plain(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql).map_err(DialectError::adapter)
    }
}

impl DbConnection for SqliteConnection {
    fn execute(&mut self, cmd: &Command) -> Result<u64> {
        let mut stmt = self.prepare(cmd)?;
        let affected = stmt.raw_execute().map_err(DialectError::adapter)?;
        Ok(affected as u64)
    }

    fn query(&mut self, cmd: &Command) -> Result<Vec<Vec<SqlValue>>> {
        let mut stmt = self.prepare(cmd)?;
        let width = stmt.column_count();
        let mut rows = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(DialectError::adapter)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_sqlite(row.get_ref(i).map_err(DialectError::adapter)?));
            }
            out.push(values);
        }
        Ok(out)
    }

    fn begin(&mut self) -> Result<()> {
        self.execute_plain("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.execute_plain("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute_plain("ROLLBACK")
    }

    fn database(&self) -> Option<&str> {
        Some(MAIN_DATABASE)
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Schema and data adapter for one SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    path: PathBuf,
    defaults: KeywordAccumulator,
}

impl SqliteAdapter {
    /// Adapter for the database file at `path` (created on first connection).
    ///
    /// Foreign-key enforcement is switched on by default; a registered
    /// `foreign_keys` keyword with higher priority overrides it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut defaults = KeywordAccumulator::new();
        defaults.add("foreign_keys", "ON", KeywordPriority::SystemDefaultLow);
        Self {
            path: path.into(),
            defaults,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Built-in defaults merged with whatever the process registered for SQLite.
    pub fn keywords(&self) -> KeywordAccumulator {
        let mut keywords = self.defaults.clone();
        keywords.merge(&KeywordRegistry::global().keywords(DatabaseType::Sqlite));
        keywords
    }

    fn schema_prefix(database: &str) -> String {
        let db = if database.trim().is_empty() {
            MAIN_DATABASE
        } else {
            database
        };
        quote_with(db, '"', '"')
    }

    fn insert_rows(conn: &mut dyn DbConnection, request: &BulkInsertRequest<'_>) -> Result<u64> {
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
}

impl DataAdapter for SqliteAdapter {
    fn open_connection(&self, database: Option<&str>) -> Result<Box<dyn DbConnection>> {
        if let Some(db) = database.filter(|d| !d.eq_ignore_ascii_case(MAIN_DATABASE)) {
            debug!("SQLite has no database '{}', using {}", db, MAIN_DATABASE);
        }
        let conn = SqliteConnection::open(&self.path, &self.keywords())?;
        Ok(Box::new(conn))
    }

    /// Inserts inside a savepoint so a failure leaves no partial rows behind.
    fn bulk_insert(&self, conn: &mut dyn DbConnection, request: &BulkInsertRequest<'_>) -> Result<u64> {
        conn.execute(&Command::new(format!("SAVEPOINT {}", DIAGNOSTIC_SAVEPOINT)))?;
        match Self::insert_rows(conn, request) {
            Ok(affected) => {
                conn.execute(&Command::new(format!("RELEASE {}", DIAGNOSTIC_SAVEPOINT)))?;
                Ok(affected)
            }
            Err(e) => {
                conn.execute(&Command::new(format!("ROLLBACK TO {}", DIAGNOSTIC_SAVEPOINT)))?;
                conn.execute(&Command::new(format!("RELEASE {}", DIAGNOSTIC_SAVEPOINT)))?;
                Err(e)
            }
        }
    }

    /// Replays the rows one at a time and reports the first one SQLite rejects.
    fn investigate_bulk_failure(
        &self,
        conn: &mut dyn DbConnection,
        request: &BulkInsertRequest<'_>,
        _error: &DialectError,
    ) -> Result<Option<String>> {
        conn.execute(&Command::new(format!("SAVEPOINT {}", DIAGNOSTIC_SAVEPOINT)))?;
        let mut cmd = Command::new(request.insert_sql.clone()).with_timeout(request.timeout_secs);
        let mut finding = None;
        for (i, row) in request.rows.iter().enumerate() {
            cmd.params = request
                .parameter_names
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            if let Err(e) = conn.execute(&cmd) {
                let values = request
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| format!("{}={:?}", c, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                finding = Some(format!("row {} ({}) was rejected: {}", i + 1, values, e));
                break;
            }
        }
        conn.execute(&Command::new(format!("ROLLBACK TO {}", DIAGNOSTIC_SAVEPOINT)))?;
        conn.execute(&Command::new(format!("RELEASE {}", DIAGNOSTIC_SAVEPOINT)))?;
        Ok(finding)
    }

    fn is_timeout(&self, error: &DialectError) -> bool {
        error
            .adapter_source()
            .and_then(|e| e.downcast_ref::<rusqlite::Error>())
            .and_then(rusqlite::Error::sqlite_error_code)
            .map(|code| matches!(code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked))
            .unwrap_or(false)
    }
}

impl SchemaAdapter for SqliteAdapter {
    fn list_databases(&self, conn: &mut dyn DbConnection) -> Result<Vec<String>> {
        let rows = conn.query(&Command::new("SELECT name FROM pragma_database_list ORDER BY seq"))?;
        Ok(rows.iter().map(|r| text_at(r, 0)).collect())
    }

    fn create_database(&self, _conn: &mut dyn DbConnection, _database: &str) -> Result<()> {
        Err(DialectError::not_supported("sqlite", "CREATE DATABASE"))
    }

    fn drop_database(&self, _conn: &mut dyn DbConnection, _database: &str) -> Result<()> {
        Err(DialectError::not_supported("sqlite", "DROP DATABASE"))
    }

    fn list_tables(
        &self,
        conn: &mut dyn DbConnection,
        database: &str,
        include_views: bool,
    ) -> Result<Vec<TableInfo>> {
        let sql = format!(
            "SELECT name, type FROM {}.sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY name",
            Self::schema_prefix(database)
        );
        let rows = conn.query(&Command::new(sql))?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                let table_type = match text_at(r, 1).as_str() {
                    "view" if include_views => TableType::View,
                    "table" => TableType::Table,
                    _ => return None,
                };
                Some(TableInfo {
                    name: text_at(r, 0),
                    schema: None,
                    table_type,
                })
            })
            .collect())
    }

    fn describe_columns(
        &self,
        conn: &mut dyn DbConnection,
        table: &TableRef<'_>,
    ) -> Result<Vec<ColumnInfo>> {
        let schema = table.database.trim();
        let schema = if schema.is_empty() { MAIN_DATABASE } else { schema };

        let create_sql = conn
            .scalar(
                &Command::new(format!(
                    "SELECT sql FROM {}.sqlite_master WHERE name = @table",
                    Self::schema_prefix(schema)
                ))
                .bind("@table", table.table),
            )?
            .as_text()
            .map(str::to_ascii_uppercase)
            .unwrap_or_default();
        let has_autoincrement = create_sql.contains("AUTOINCREMENT");

        let rows = conn.query(
            &Command::new(
                "SELECT name, type, \"notnull\", pk, dflt_value FROM pragma_table_info(@table, @schema) ORDER BY cid",
            )
            .bind("@table", table.table)
            .bind("@schema", schema),
        )?;

        Ok(rows
            .iter()
            .map(|r| {
                let data_type = text_at(r, 1);
                let is_primary_key = int_at(r, 3) > 0;
                let mut attributes = BTreeMap::new();
                if let Some(SqlValue::Text(default)) = r.get(4) {
                    attributes.insert("default".to_string(), default.clone());
                }
                ColumnInfo {
                    name: text_at(r, 0),
                    is_auto_increment: has_autoincrement
                        && is_primary_key
                        && data_type.eq_ignore_ascii_case("integer"),
                    data_type,
                    // SQLite lets primary keys hold NULL unless declared NOT NULL
                    allow_nulls: int_at(r, 2) == 0,
                    is_primary_key,
                    collation: None,
                    attributes,
                }
            })
            .collect())
    }

    /// Foreign keys in which `table` is the referenced (primary) table.
    fn list_relationships(
        &self,
        conn: &mut dyn DbConnection,
        table: &TableRef<'_>,
    ) -> Result<Vec<Relationship>> {
        let schema = if table.database.trim().is_empty() {
            MAIN_DATABASE
        } else {
            table.database
        };
        let mut relationships = Vec::new();
        for child in self.list_tables(conn, schema, false)? {
            let rows = conn.query(
                &Command::new(
                    "SELECT id, \"table\", \"from\", \"to\", on_delete \
                     FROM pragma_foreign_key_list(@table, @schema) ORDER BY id, seq",
                )
                .bind("@table", child.name.as_str())
                .bind("@schema", schema),
            )?;

            let mut by_id: BTreeMap<i64, Relationship> = BTreeMap::new();
            for r in rows.iter().filter(|r| text_at(r, 1).eq_ignore_ascii_case(table.table)) {
                let relationship = by_id.entry(int_at(r, 0)).or_insert_with(|| {
                    Relationship::new(
                        foreign_key_constraint_name(&child.name, table.table),
                        table.table,
                        child.name.as_str(),
                        CascadeRule::from_sql(&text_at(r, 4)),
                    )
                });
                relationship.add_key(text_at(r, 3), text_at(r, 2));
            }
            relationships.extend(by_id.into_values());
        }
        Ok(relationships)
    }

    fn drop_table(&self, conn: &mut dyn DbConnection, table: &TableRef<'_>) -> Result<()> {
        if table.table_type == TableType::TableValuedFunction {
            return Err(DialectError::not_supported("sqlite", "table-valued functions"));
        }
        let fqn = format!(
            "{}.{}",
            Self::schema_prefix(table.database),
            quote_with(table.table, '"', '"')
        );
        let sql = SqliteTableHelper::new().drop_table_sql(&fqn, table.table_type);
        conn.execute(&Command::new(sql))?;
        info!("Dropped {:?} {}", table.table_type, fqn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_adapter() -> (tempfile::TempDir, SqliteAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let adapter = SqliteAdapter::new(dir.path().join("test.db"));
        (dir, adapter)
    }

    #[test]
    fn test_named_parameters_round_trip() {
        let (_dir, adapter) = temp_adapter();
        let mut conn = adapter.open_connection(None).unwrap();
        conn.execute(&Command::new("CREATE TABLE t (a int, b text)")).unwrap();
        let affected = conn
            .execute(
                &Command::new("INSERT INTO t(a, b) VALUES (@a, @b)")
                    .bind("@a", 7i32)
                    .bind("@b", "seven"),
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = conn.query(&Command::new("SELECT a, b FROM t")).unwrap();
        assert_eq!(rows, vec![vec![SqlValue::I64(7), SqlValue::Text("seven".into())]]);
    }

    #[test]
    fn test_datetime_stored_as_iso_text() {
        let (_dir, adapter) = temp_adapter();
        let mut conn = adapter.open_connection(None).unwrap();
        conn.execute(&Command::new("CREATE TABLE t (d datetime)")).unwrap();
        let dt = NaiveDate::from_ymd_opt(2007, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        conn.execute(&Command::new("INSERT INTO t VALUES (@d)").bind("@d", SqlValue::DateTime(dt)))
            .unwrap();
        let v = conn.scalar(&Command::new("SELECT d FROM t")).unwrap();
        assert_eq!(v, SqlValue::Text("2007-01-01 00:00:00".into()));
    }

    #[test]
    fn test_foreign_keys_enabled_by_default() {
        let (_dir, adapter) = temp_adapter();
        let mut conn = adapter.open_connection(None).unwrap();
        let v = conn.scalar(&Command::new("PRAGMA foreign_keys")).unwrap();
        assert_eq!(v, SqlValue::I64(1));
    }

    #[test]
    fn test_describe_columns() {
        let (_dir, adapter) = temp_adapter();
        let mut conn = adapter.open_connection(None).unwrap();
        conn.execute(&Command::new(
            "CREATE TABLE people (id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, name varchar(10) NULL)",
        ))
        .unwrap();
        let table = TableRef {
            database: MAIN_DATABASE,
            schema: None,
            table: "people",
            table_type: TableType::Table,
        };
        let cols = adapter.describe_columns(conn.as_mut(), &table).unwrap();
        assert_eq!(cols.len(), 2);
        assert!(cols[0].is_primary_key);
        assert!(cols[0].is_auto_increment);
        assert!(!cols[0].allow_nulls);
        assert_eq!(cols[1].data_type, "varchar(10)");
        assert!(cols[1].allow_nulls);
        assert!(adapter.table_exists(conn.as_mut(), &table).unwrap());
    }

    #[test]
    fn test_busy_is_timeout() {
        let (_dir, adapter) = temp_adapter();
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(adapter.is_timeout(&DialectError::adapter(busy)));
        assert!(!adapter.is_timeout(&DialectError::naming("x")));
    }
}
