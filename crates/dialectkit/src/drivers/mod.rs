//! Per-engine dialect implementations.
//!
//! Each driver module provides the three SQL-text strategies for its engine:
//!
//! - [`mssql`]: Microsoft SQL Server
//! - [`mysql`]: MySQL / MariaDB
//! - [`postgres`]: PostgreSQL
//! - [`oracle`]: Oracle
//! - [`sqlite`]: SQLite, plus the reference `rusqlite` adapters
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/db2/`)
//! 2. Implement `QuerySyntax`, `TypeTranslater` and `TableHelper`
//! 3. Add a `DatabaseType` variant and wire it into `Dialect::for_type`
//! 4. Register its names in `DialectCatalog::with_builtins()`
//! 5. Gate any physical adapter behind a feature flag in `Cargo.toml`

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use mssql::{MssqlSyntax, MssqlTableHelper, MssqlTypeTranslater};
pub use mysql::{MysqlSyntax, MysqlTableHelper, MysqlTypeTranslater};
pub use oracle::{OracleSyntax, OracleTableHelper, OracleTypeTranslater};
pub use postgres::{PostgresSyntax, PostgresTableHelper, PostgresTypeTranslater};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteAdapter, SqliteConnection};
pub use sqlite::{SqliteSyntax, SqliteTableHelper, SqliteTypeTranslater};
