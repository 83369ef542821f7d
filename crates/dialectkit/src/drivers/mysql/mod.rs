//! MySQL/MariaDB dialect.
//!
//! This module provides MySQL-specific strategies:
//! - [`MysqlSyntax`]: backtick quoting, `` `db`.`table` `` qualification, `LIMIT n`
//! - [`MysqlTypeTranslater`]: `varchar(4000)` ceiling, `longtext`, `bit` booleans
//! - [`MysqlTableHelper`]: `MODIFY COLUMN`, `RENAME TABLE`, two-step boolean widening
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod dialect;
mod table;
mod types;

pub use dialect::MysqlSyntax;
pub use table::MysqlTableHelper;
pub use types::MysqlTypeTranslater;
