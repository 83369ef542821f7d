//! Dialect strategies and the bundle that ties them together.
//!
//! A dialect is three narrow strategies selected once per target:
//!
//! - [`TypeTranslater`]: [`TypeRequest`](crate::core::TypeRequest) ⇄ proprietary type strings
//! - [`QuerySyntax`]: identifier quoting, qualified names, parameters, top-N
//! - [`TableHelper`]: SQL text for ALTER/RENAME/TRUNCATE/distinct/identity
//!
//! The schema object model and the pipelines depend only on these traits.
//! [`Dialect`] bundles one implementation of each behind `Arc`s so it can be
//! cloned freely into every discovered object.
//!
//! # Usage
//!
//! ```rust,ignore
//! let dialect = Dialect::for_type(DatabaseType::from_db_type("postgres")?);
//! let sql_type = dialect.translater().to_proprietary_type(&TypeRequest::string(10));
//! assert_eq!(sql_type, "varchar(10)");
//! ```

mod syntax;
mod table_helper;
mod translater;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

pub use syntax::{
    parameter_names_for, verify_alias_contract, QuerySyntax, ScalarFunction, TopN, TopNPlacement,
};
pub use table_helper::{
    alter_column_statement, alter_not_supported, foreign_key_constraint_sql, TableHelper,
};
pub use translater::{
    canonical_type_name, parse_qualifier, TypeQualifier, TypeTranslater, NOT_A_STRING,
    UNLIMITED_LENGTH,
};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Mssql,
    Mysql,
    Postgres,
    Oracle,
    Sqlite,
}

impl DatabaseType {
    /// All built-in engines.
    pub const ALL: [DatabaseType; 5] = [
        DatabaseType::Mssql,
        DatabaseType::Mysql,
        DatabaseType::Postgres,
        DatabaseType::Oracle,
        DatabaseType::Sqlite,
    ];

    /// Parse a database type name, accepting the common aliases.
    pub fn from_db_type(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(DatabaseType::Mssql),
            "mysql" | "mariadb" => Ok(DatabaseType::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(DatabaseType::Postgres),
            "oracle" => Ok(DatabaseType::Oracle),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            other => Err(DialectError::Config(format!(
                "Unknown database type: '{}'. Supported types: mssql, mysql, postgres, oracle, sqlite",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseType::Mssql => "mssql",
            DatabaseType::Mysql => "mysql",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Oracle => "oracle",
            DatabaseType::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One engine's strategies, shared by every object bound to that engine.
#[derive(Clone)]
pub struct Dialect {
    syntax: Arc<dyn QuerySyntax>,
    translater: Arc<dyn TypeTranslater>,
    helper: Arc<dyn TableHelper>,
}

impl Dialect {
    pub fn new(
        syntax: Arc<dyn QuerySyntax>,
        translater: Arc<dyn TypeTranslater>,
        helper: Arc<dyn TableHelper>,
    ) -> Self {
        Self {
            syntax,
            translater,
            helper,
        }
    }

    /// The built-in strategies for `db`.
    pub fn for_type(db: DatabaseType) -> Self {
        use crate::drivers::{mssql, mysql, oracle, postgres, sqlite};

        match db {
            DatabaseType::Mssql => Self::new(
                Arc::new(mssql::MssqlSyntax::new()),
                Arc::new(mssql::MssqlTypeTranslater::new()),
                Arc::new(mssql::MssqlTableHelper::new()),
            ),
            DatabaseType::Mysql => Self::new(
                Arc::new(mysql::MysqlSyntax::new()),
                Arc::new(mysql::MysqlTypeTranslater::new()),
                Arc::new(mysql::MysqlTableHelper::new()),
            ),
            DatabaseType::Postgres => Self::new(
                Arc::new(postgres::PostgresSyntax::new()),
                Arc::new(postgres::PostgresTypeTranslater::new()),
                Arc::new(postgres::PostgresTableHelper::new()),
            ),
            DatabaseType::Oracle => Self::new(
                Arc::new(oracle::OracleSyntax::new()),
                Arc::new(oracle::OracleTypeTranslater::new()),
                Arc::new(oracle::OracleTableHelper::new()),
            ),
            DatabaseType::Sqlite => Self::new(
                Arc::new(sqlite::SqliteSyntax::new()),
                Arc::new(sqlite::SqliteTypeTranslater::new()),
                Arc::new(sqlite::SqliteTableHelper::new()),
            ),
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        self.syntax.database_type()
    }

    pub fn syntax(&self) -> &dyn QuerySyntax {
        self.syntax.as_ref()
    }

    pub fn translater(&self) -> &dyn TypeTranslater {
        self.translater.as_ref()
    }

    pub fn helper(&self) -> &dyn TableHelper {
        self.helper.as_ref()
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("database_type", &self.database_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_type_aliases() {
        assert_eq!(DatabaseType::from_db_type("SqlServer").unwrap(), DatabaseType::Mssql);
        assert_eq!(DatabaseType::from_db_type("mariadb").unwrap(), DatabaseType::Mysql);
        assert_eq!(DatabaseType::from_db_type(" pg ").unwrap(), DatabaseType::Postgres);
        assert_eq!(DatabaseType::from_db_type("sqlite3").unwrap(), DatabaseType::Sqlite);
    }

    #[test]
    fn test_from_db_type_unknown() {
        let err = DatabaseType::from_db_type("db2").unwrap_err();
        assert!(err.to_string().contains("Unknown database type: 'db2'"));
    }

    #[test]
    fn test_bundle_strategies_agree_on_type() {
        for db in DatabaseType::ALL {
            let d = Dialect::for_type(db);
            assert_eq!(d.database_type(), db);
            assert_eq!(d.translater().database_type(), db);
            assert_eq!(d.helper().database_type(), db);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DatabaseType::Postgres).unwrap();
        assert_eq!(json, "\"postgres\"");
    }
}
