//! Database handle.

use tracing::info;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::pipeline::{self, CreateTableArgs, CreateTableReport};

use super::server::DiscoveredServer;
use super::table::DiscoveredTable;
use super::transaction::{with_connection, ManagedTransaction};
use super::TableType;

/// A database on a [`DiscoveredServer`]. May not exist yet.
#[derive(Debug, Clone)]
pub struct DiscoveredDatabase {
    server: DiscoveredServer,
    name: String,
}

impl DiscoveredDatabase {
    pub(crate) fn new(server: DiscoveredServer, name: String) -> Self {
        Self { server, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &DiscoveredServer {
        &self.server
    }

    pub fn dialect(&self) -> &Dialect {
        self.server.dialect()
    }

    pub fn exists(&self, transaction: Option<&mut ManagedTransaction>) -> Result<bool> {
        with_connection(self.server.data_adapter(), None, transaction, |conn| {
            self.server.schema_adapter().database_exists(conn, &self.name)
        })
    }

    pub fn create(&self) -> Result<()> {
        self.dialect().syntax().validate_database_name(&self.name)?;
        let mut conn = self.server.open_connection(None)?;
        self.server
            .schema_adapter()
            .create_database(conn.as_mut(), &self.name)?;
        info!("Created database {}", self.name);
        Ok(())
    }

    pub fn drop_database(&self) -> Result<()> {
        let mut conn = self.server.open_connection(None)?;
        self.server
            .schema_adapter()
            .drop_database(conn.as_mut(), &self.name)?;
        info!("Dropped database {}", self.name);
        Ok(())
    }

    pub fn discover_tables(
        &self,
        include_views: bool,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<Vec<DiscoveredTable>> {
        let infos = with_connection(
            self.server.data_adapter(),
            Some(&self.name),
            transaction,
            |conn| {
                self.server
                    .schema_adapter()
                    .list_tables(conn, &self.name, include_views)
            },
        )?;
        Ok(infos
            .into_iter()
            .map(|t| self.expect_table(t.name, t.schema.as_deref(), t.table_type))
            .collect())
    }

    /// Handle for a table-like object. Does not check that it exists.
    pub fn expect_table(
        &self,
        name: impl Into<String>,
        schema: Option<&str>,
        table_type: TableType,
    ) -> DiscoveredTable {
        DiscoveredTable::new(
            self.clone(),
            name.into(),
            schema.map(str::to_string),
            table_type,
        )
    }

    /// Create a table from explicit column requests and/or sampled data,
    /// then upload the data unless `args` asks for an empty table.
    pub fn create_table(&self, args: CreateTableArgs<'_>) -> Result<DiscoveredTable> {
        Ok(self.create_table_with_report(args)?.0)
    }

    /// [`create_table`](Self::create_table), also returning the resolved
    /// column types, batch timings and rows uploaded.
    ///
    /// If the table is created but the upload fails, the error is
    /// [`DialectError::UploadAfterCreateFailed`](crate::error::DialectError::UploadAfterCreateFailed)
    /// and carries the report.
    pub fn create_table_with_report(
        &self,
        args: CreateTableArgs<'_>,
    ) -> Result<(DiscoveredTable, CreateTableReport)> {
        pipeline::create_table(self, args)
    }
}
