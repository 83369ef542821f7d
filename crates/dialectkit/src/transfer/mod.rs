//! Bulk load engine.
//!
//! A [`BulkLoadSession`] reconciles a loosely typed [`DataSet`] with the
//! rigid schema of an existing table:
//!
//! 1. Input columns are mapped onto destination columns ignoring case
//!    ([`map_columns`]).
//! 2. Text bound for date or time columns is parsed up front
//!    ([`coerce_date_like_columns`]).
//! 3. The rows, reordered to destination order, go to the adapter's physical
//!    bulk insert. On failure the adapter gets one chance to pin the failure
//!    to a row before the error is surfaced.
//!
//! # Connection ownership
//!
//! A session either borrows the caller's [`ManagedTransaction`] or owns a
//! private connection. Only the private connection is ever committed, rolled
//! back or closed by the session.

mod coerce;
mod mapping;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::BulkLoadConfig;
use crate::core::dataset::DataSet;
use crate::core::traits::{BulkInsertRequest, DbConnection, DEFAULT_TIMEOUT_SECS};
use crate::core::type_request::TypeKind;
use crate::dialect::parameter_names_for;
use crate::error::{DialectError, Result};
use crate::guess::Culture;
use crate::schema::{DiscoveredColumn, DiscoveredTable, ManagedTransaction};

pub use coerce::{coerce_date_like_columns, DEFAULT_DATE_SAMPLE_SIZE};
pub use mapping::{map_columns, ColumnMapping};

enum SessionConnection<'t> {
    Owned(Box<dyn DbConnection>),
    External(&'t mut ManagedTransaction),
}

impl SessionConnection<'_> {
    fn get(&mut self) -> &mut dyn DbConnection {
        match self {
            SessionConnection::Owned(conn) => conn.as_mut(),
            SessionConnection::External(tx) => tx.connection(),
        }
    }
}

/// Statistics from one [`BulkLoadSession::upload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub rows: u64,
    /// Date/time values that did not parse and were loaded as NULL.
    pub nulled_values: usize,
}

/// Loads datasets into one table.
pub struct BulkLoadSession<'t> {
    table: DiscoveredTable,
    connection: SessionConnection<'t>,
    culture: Culture,
    timeout_secs: u32,
    allow_unmatched_input_columns: bool,
    date_sample_size: usize,
    columns: Option<Vec<DiscoveredColumn>>,
}

impl<'t> BulkLoadSession<'t> {
    pub(crate) fn new(
        table: DiscoveredTable,
        culture: Culture,
        transaction: Option<&'t mut ManagedTransaction>,
    ) -> Result<Self> {
        let connection = match transaction {
            Some(tx) => SessionConnection::External(tx),
            None => SessionConnection::Owned(
                table
                    .server()
                    .data_adapter()
                    .open_connection(Some(table.database().name()))?,
            ),
        };
        debug!("Bulk load session opened for {}", table.name());
        Ok(Self {
            table,
            connection,
            culture,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            allow_unmatched_input_columns: false,
            date_sample_size: DEFAULT_DATE_SAMPLE_SIZE,
            columns: None,
        })
    }

    pub fn table(&self) -> &DiscoveredTable {
        &self.table
    }

    pub fn culture(&self) -> Culture {
        self.culture
    }

    /// Per-call timeout handed to the adapter.
    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    pub fn set_timeout_secs(&mut self, timeout_secs: u32) {
        self.timeout_secs = timeout_secs;
    }

    pub fn set_allow_unmatched_input_columns(&mut self, allow: bool) {
        self.allow_unmatched_input_columns = allow;
    }

    pub fn set_date_sample_size(&mut self, sample_size: usize) {
        self.date_sample_size = sample_size.max(1);
    }

    /// Take culture, timeout, unmatched-column policy and date sampling from
    /// configuration.
    pub fn apply_config(&mut self, config: &BulkLoadConfig) {
        self.culture = config.culture;
        self.set_timeout_secs(config.timeout_secs);
        self.set_allow_unmatched_input_columns(config.allow_unmatched_input_columns);
        self.set_date_sample_size(config.date_sample_size);
    }

    /// Destination columns, discovered once and cached.
    pub fn destination_columns(&mut self) -> Result<&[DiscoveredColumn]> {
        if self.columns.is_none() {
            let columns = self.table.discover_columns_on(self.connection.get())?;
            self.columns = Some(columns);
        }
        Ok(self.columns.as_deref().unwrap_or_default())
    }

    /// Forget the cached destination columns. Call after altering the table
    /// mid-session.
    pub fn invalidate_schema_cache(&mut self) {
        self.columns = None;
    }

    /// Map `input` column names onto the destination columns.
    pub fn map<S: AsRef<str>>(&mut self, input: &[S]) -> Result<ColumnMapping> {
        let allow = self.allow_unmatched_input_columns;
        let table = self.table.name().to_string();
        let names: Vec<String> = self
            .destination_columns()?
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        map_columns(input, &names, &table, allow)
    }

    /// Upload every row of `data`. Returns the number of rows written.
    pub fn upload(&mut self, data: &DataSet) -> Result<u64> {
        Ok(self.upload_with_stats(data)?.rows)
    }

    pub fn upload_with_stats(&mut self, data: &DataSet) -> Result<UploadStats> {
        let input: Vec<&str> = data.columns().iter().map(|c| c.name.as_str()).collect();
        let mapping = self.map(&input)?;
        if data.is_empty() {
            return Ok(UploadStats::default());
        }
        let started = Instant::now();

        let columns = self.destination_columns()?.to_vec();
        let targets: Vec<(usize, TypeKind)> = mapping
            .pairs
            .iter()
            .filter_map(|&(i, d)| columns[d].data_type().host_kind().ok().map(|k| (i, k)))
            .collect();
        let mut data = data.clone();
        let nulled_values =
            coerce_date_like_columns(&mut data, &targets, self.culture, self.date_sample_size)?;

        let dialect = self.table.dialect().clone();
        let fqn = self.table.fully_qualified_name()?;
        let names: Vec<String> = mapping
            .pairs
            .iter()
            .map(|&(_, d)| columns[d].name().to_string())
            .collect();
        let wrapped = mapping
            .pairs
            .iter()
            .map(|&(_, d)| columns[d].wrapped_name())
            .collect::<Result<Vec<_>>>()?;
        let parameter_names = parameter_names_for(dialect.syntax(), &names);
        let request = BulkInsertRequest {
            table: &fqn,
            insert_sql: dialect.helper().insert_sql(&fqn, &wrapped, &parameter_names),
            columns: names,
            parameter_names,
            rows: data
                .rows()
                .iter()
                .map(|row| mapping.pairs.iter().map(|&(i, _)| row[i].clone()).collect())
                .collect(),
            timeout_secs: self.timeout_secs,
        };

        let rows = self.insert(&request)?;
        info!(
            "Uploaded {} rows to {} in {:?}",
            rows,
            self.table.name(),
            started.elapsed()
        );
        Ok(UploadStats {
            rows,
            nulled_values,
        })
    }

    fn insert(&mut self, request: &BulkInsertRequest<'_>) -> Result<u64> {
        let adapter = self.table.server().data_adapter();
        let owned = matches!(self.connection, SessionConnection::Owned(_));
        let conn = self.connection.get();

        if owned {
            conn.begin()?;
        }
        let error = match adapter.bulk_insert(conn, request) {
            Ok(rows) => {
                if owned {
                    conn.commit()?;
                }
                return Ok(rows);
            }
            Err(e) => e,
        };
        if owned {
            if let Err(rollback) = conn.rollback() {
                warn!("Rollback after failed bulk insert also failed: {}", rollback);
            }
        }

        if adapter.is_timeout(&error) {
            return Err(error);
        }
        match adapter.investigate_bulk_failure(conn, request, &error) {
            Ok(Some(detail)) => Err(DialectError::BulkInsertFailed {
                detail,
                source: Box::new(error),
            }),
            Ok(None) => Err(error),
            Err(diagnostic) => Err(DialectError::BulkInsertDiagnosticFailed {
                original: Box::new(error),
                diagnostic: Box::new(diagnostic),
            }),
        }
    }
}

impl Drop for BulkLoadSession<'_> {
    fn drop(&mut self) {
        debug!("Bulk load session closed for {}", self.table.name());
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::core::dataset::DataColumn;
    use crate::core::traits::Command;
    use crate::core::value::SqlValue;
    use crate::schema::{DiscoveredServer, TableType};

    fn people() -> (tempfile::TempDir, DiscoveredTable) {
        let dir = tempfile::tempdir().unwrap();
        let server = DiscoveredServer::sqlite(dir.path().join("bulk.db"));
        let mut conn = server.data_adapter().open_connection(None).unwrap();
        conn.execute(&Command::new(
            "CREATE TABLE people (name varchar(10) NOT NULL, dob datetime NULL, shoe int NULL)",
        ))
        .unwrap();
        let table = server
            .current_database()
            .unwrap()
            .expect_table("people", None, TableType::Table);
        (dir, table)
    }

    #[test]
    fn test_upload_maps_case_insensitively_and_coerces_dates() {
        let (_dir, table) = people();
        let mut ds = DataSet::new("in")
            .with_column(DataColumn::text("DOB"))
            .with_column(DataColumn::text("Name"));
        ds.push_row(["01/01/2007 00:00:00", "dave"]).unwrap();
        ds.push_row(["2007-01-01 00:00:00", "frank"]).unwrap();
        ds.push_row(["rubbish", "ann"]).unwrap();

        let mut session = table.begin_bulk_insert(Culture::EnUs, None).unwrap();
        let stats = session.upload_with_stats(&ds).unwrap();
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.nulled_values, 1);
        drop(session);

        let mut conn = table.server().data_adapter().open_connection(None).unwrap();
        let rows = conn
            .query(&Command::new("SELECT dob FROM people ORDER BY name"))
            .unwrap();
        assert_eq!(rows[0][0], SqlValue::Null);
        assert_eq!(rows[1][0], SqlValue::Text("2007-01-01 00:00:00".into()));
        assert_eq!(rows[2][0], SqlValue::Text("2007-01-01 00:00:00".into()));
    }

    #[test]
    fn test_unmatched_input_column_rejected_unless_allowed() {
        let (_dir, table) = people();
        let mut ds = DataSet::new("in")
            .with_column(DataColumn::text("name"))
            .with_column(DataColumn::text("hat"));
        ds.push_row(["dave", "fedora"]).unwrap();

        let mut session = table.begin_bulk_insert(Culture::EnUs, None).unwrap();
        let err = session.upload(&ds).unwrap_err();
        assert!(matches!(err, DialectError::ColumnMapping { .. }));

        session.set_allow_unmatched_input_columns(true);
        assert_eq!(session.upload(&ds).unwrap(), 1);
    }

    #[test]
    fn test_failed_upload_names_the_row() {
        let (_dir, table) = people();
        let mut ds = DataSet::new("in")
            .with_column(DataColumn::text("name"))
            .with_column(DataColumn::typed("shoe", crate::core::type_request::TypeKind::Int32));
        ds.push_row([SqlValue::from("dave"), SqlValue::I32(9)]).unwrap();
        ds.push_row([SqlValue::Null, SqlValue::I32(10)]).unwrap();

        let mut session = table.begin_bulk_insert(Culture::EnUs, None).unwrap();
        let err = session.upload(&ds).unwrap_err();
        match err {
            DialectError::BulkInsertFailed { detail, .. } => assert!(detail.contains("row 2")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(table.row_count(None).unwrap(), 0);
    }

    #[test]
    fn test_external_transaction_is_not_committed() {
        let (_dir, table) = people();
        let mut ds = DataSet::new("in").with_column(DataColumn::text("name"));
        ds.push_row(["dave"]).unwrap();

        let mut tx = table.server().begin_new_transacted_connection().unwrap();
        {
            let mut session = table.begin_bulk_insert(Culture::EnUs, Some(&mut tx)).unwrap();
            assert_eq!(session.upload(&ds).unwrap(), 1);
        }
        assert_eq!(table.row_count(Some(&mut tx)).unwrap(), 1);
        tx.abandon_and_close().unwrap();
        assert_eq!(table.row_count(None).unwrap(), 0);
    }

    #[test]
    fn test_invalidate_schema_cache_sees_new_column() {
        let (_dir, table) = people();
        let mut session = table.begin_bulk_insert(Culture::EnUs, None).unwrap();
        assert_eq!(session.destination_columns().unwrap().len(), 3);

        table
            .add_column_with_type("hat", "varchar(5)", true, None)
            .unwrap();
        assert!(session.map(&["hat"]).is_err());
        session.invalidate_schema_cache();
        assert!(session.map(&["hat"]).is_ok());
    }
}
