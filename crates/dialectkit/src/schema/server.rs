//! Server handle: the root of the discovered object graph.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::keywords::{KeywordAccumulator, KeywordRegistry};
use crate::core::traits::{DataAdapter, DbConnection, SchemaAdapter};
use crate::dialect::{DatabaseType, Dialect};
use crate::error::Result;

use super::database::DiscoveredDatabase;
use super::transaction::ManagedTransaction;

/// A database server reached through one dialect and one pair of adapters.
#[derive(Clone)]
pub struct DiscoveredServer {
    dialect: Dialect,
    schema_adapter: Arc<dyn SchemaAdapter>,
    data_adapter: Arc<dyn DataAdapter>,
    default_database: Option<String>,
}

impl DiscoveredServer {
    pub fn new(
        dialect: Dialect,
        schema_adapter: Arc<dyn SchemaAdapter>,
        data_adapter: Arc<dyn DataAdapter>,
    ) -> Self {
        Self {
            dialect,
            schema_adapter,
            data_adapter,
            default_database: None,
        }
    }

    /// Server backed by the reference SQLite adapter for the file at `path`.
    #[cfg(feature = "sqlite")]
    pub fn sqlite(path: impl Into<std::path::PathBuf>) -> Self {
        use crate::drivers::sqlite::{SqliteAdapter, MAIN_DATABASE};

        let adapter = Arc::new(SqliteAdapter::new(path));
        Self::new(Dialect::for_type(DatabaseType::Sqlite), adapter.clone(), adapter)
            .with_default_database(MAIN_DATABASE)
    }

    /// Database used when a caller does not name one.
    pub fn with_default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = Some(database.into());
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn database_type(&self) -> DatabaseType {
        self.dialect.database_type()
    }

    pub fn schema_adapter(&self) -> &dyn SchemaAdapter {
        self.schema_adapter.as_ref()
    }

    pub fn data_adapter(&self) -> &dyn DataAdapter {
        self.data_adapter.as_ref()
    }

    /// Handle for `name`. Does not check that it exists.
    pub fn expect_database(&self, name: impl Into<String>) -> DiscoveredDatabase {
        DiscoveredDatabase::new(self.clone(), name.into())
    }

    /// Handle for the default database, if one was configured.
    pub fn current_database(&self) -> Option<DiscoveredDatabase> {
        self.default_database
            .as_deref()
            .map(|name| self.expect_database(name))
    }

    pub fn discover_databases(&self) -> Result<Vec<DiscoveredDatabase>> {
        let mut conn = self.open_connection(None)?;
        Ok(self
            .schema_adapter
            .list_databases(conn.as_mut())?
            .into_iter()
            .map(|name| self.expect_database(name))
            .collect())
    }

    /// Whether the server accepts connections.
    ///
    /// Timeouts are reported as errors rather than as "does not exist".
    pub fn exists(&self) -> Result<bool> {
        match self.open_connection(None) {
            Ok(_) => Ok(true),
            Err(e) if self.data_adapter.is_timeout(&e) => Err(e),
            Err(e) => {
                debug!("Server not reachable: {}", e);
                Ok(false)
            }
        }
    }

    /// Open a connection and start a transaction on it, pointed at the
    /// default database.
    pub fn begin_new_transacted_connection(&self) -> Result<ManagedTransaction> {
        let conn = self.open_connection(self.default_database.as_deref())?;
        ManagedTransaction::begin(conn)
    }

    /// Keywords registered process-wide for this server's dialect.
    pub fn connection_keywords(&self) -> KeywordAccumulator {
        KeywordRegistry::global().keywords(self.database_type())
    }

    pub(crate) fn open_connection(&self, database: Option<&str>) -> Result<Box<dyn DbConnection>> {
        self.data_adapter.open_connection(database)
    }
}

impl fmt::Debug for DiscoveredServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredServer")
            .field("database_type", &self.database_type())
            .field("default_database", &self.default_database)
            .finish()
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::core::keywords::KeywordPriority;

    #[test]
    fn test_sqlite_server_lists_main() {
        let dir = tempfile::tempdir().unwrap();
        let server = DiscoveredServer::sqlite(dir.path().join("s.db"));
        assert!(server.exists().unwrap());
        let names: Vec<String> = server
            .discover_databases()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert!(names.contains(&"main".to_string()));
        assert_eq!(server.current_database().unwrap().name(), "main");
    }

    #[test]
    fn test_connection_keywords_reflect_registry() {
        KeywordRegistry::global().add(
            DatabaseType::Sqlite,
            "cache_size",
            "2000",
            KeywordPriority::SystemDefaultMedium,
        );
        let server = DiscoveredServer::sqlite("unused.db");
        let keywords = server.connection_keywords();
        assert_eq!(keywords.get("cache_size").map(|k| k.value.as_str()), Some("2000"));
    }

    #[test]
    fn test_transaction_from_server_rolls_back_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let server = DiscoveredServer::sqlite(dir.path().join("t.db"));
        {
            let mut conn = server.open_connection(None).unwrap();
            conn.execute(&crate::core::traits::Command::new("CREATE TABLE t (a int)"))
                .unwrap();
        }
        {
            let mut tx = server.begin_new_transacted_connection().unwrap();
            tx.connection()
                .execute(&crate::core::traits::Command::new("INSERT INTO t VALUES (1)"))
                .unwrap();
        }
        let mut conn = server.open_connection(None).unwrap();
        let count = conn
            .scalar(&crate::core::traits::Command::new("SELECT COUNT(*) FROM t"))
            .unwrap();
        assert_eq!(count.as_i64(), Some(0));
    }
}
