//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] maps dialect names (and their aliases) to
//! [`Dialect`] bundles. It is explicitly constructed and passed to whatever
//! needs to resolve a dialect by name, rather than being a global singleton.
//!
//! # Design Rationale
//!
//! - **No global state**: schema state never lives in the catalog
//! - **Explicit registration**: clear, deterministic initialization order
//! - **Testable**: custom dialects can be registered next to the built-ins

use std::collections::HashMap;

use crate::dialect::{DatabaseType, Dialect};
use crate::error::{DialectError, Result};

/// Names under which each built-in dialect is registered.
const BUILTIN_ALIASES: &[(DatabaseType, &[&str])] = &[
    (DatabaseType::Mssql, &["mssql", "sqlserver", "sql_server"]),
    (DatabaseType::Mysql, &["mysql", "mariadb"]),
    (DatabaseType::Postgres, &["postgres", "postgresql", "pg"]),
    (DatabaseType::Oracle, &["oracle"]),
    (DatabaseType::Sqlite, &["sqlite", "sqlite3"]),
];

/// Registry of dialects by (case-insensitive) name.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = DialectCatalog::with_builtins();
/// let dialect = catalog.require_dialect("SqlServer")?;
/// assert_eq!(dialect.database_type(), DatabaseType::Mssql);
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    dialects: HashMap<String, Dialect>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with every built-in dialect registered under its
    /// canonical name and aliases.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for (db, names) in BUILTIN_ALIASES {
            let dialect = Dialect::for_type(*db);
            for name in *names {
                catalog.register_dialect(*name, dialect.clone());
            }
        }
        catalog
    }

    /// Register a dialect by name, replacing any previous registration.
    pub fn register_dialect(&mut self, name: impl Into<String>, dialect: Dialect) {
        self.dialects.insert(name.into().to_lowercase(), dialect);
    }

    /// Get a dialect by name.
    pub fn get_dialect(&self, name: &str) -> Option<Dialect> {
        self.dialects.get(&name.trim().to_lowercase()).cloned()
    }

    /// Get a dialect by name, returning an error if not found.
    pub fn require_dialect(&self, name: &str) -> Result<Dialect> {
        self.get_dialect(name)
            .ok_or_else(|| DialectError::Config(format!("Unknown database dialect: {}", name)))
    }

    /// Check if a dialect is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.dialects.contains_key(&name.trim().to_lowercase())
    }

    /// All registered names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectCatalog")
            .field("dialects", &self.dialect_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_resolve_aliases() {
        let catalog = DialectCatalog::with_builtins();
        for (name, db) in [
            ("mssql", DatabaseType::Mssql),
            ("SqlServer", DatabaseType::Mssql),
            ("mariadb", DatabaseType::Mysql),
            ("PostgreSQL", DatabaseType::Postgres),
            ("pg", DatabaseType::Postgres),
            ("oracle", DatabaseType::Oracle),
            ("sqlite", DatabaseType::Sqlite),
        ] {
            assert_eq!(catalog.require_dialect(name).unwrap().database_type(), db, "{}", name);
        }
    }

    #[test]
    fn test_require_unknown_dialect() {
        let catalog = DialectCatalog::with_builtins();
        let err = catalog.require_dialect("db2").unwrap_err();
        assert!(matches!(err, DialectError::Config(_)));
        assert!(err.to_string().contains("Unknown database dialect: db2"));
    }

    #[test]
    fn test_register_custom_name() {
        let mut catalog = DialectCatalog::new();
        assert!(!catalog.has_dialect("warehouse"));
        catalog.register_dialect("Warehouse", Dialect::for_type(DatabaseType::Postgres));
        assert!(catalog.has_dialect("warehouse"));
        assert_eq!(catalog.dialect_names(), vec!["warehouse"]);
    }
}
