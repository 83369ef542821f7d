//! Microsoft SQL Server dialect.
//!
//! This module provides MSSQL-specific strategies:
//!
//! - [`MssqlSyntax`]: bracket quoting, `[db]..[table]` qualification, `TOP n`
//! - [`MssqlTypeTranslater`]: `varchar(8000)` / `nvarchar(4000)` ceilings, `(max)` types
//! - [`MssqlTableHelper`]: `ALTER COLUMN`, `sp_rename`, `SELECT ... INTO`
//!
//! The physical driver is external; these strategies only produce SQL text.

mod dialect;
mod table;
mod types;

pub use dialect::MssqlSyntax;
pub use table::MssqlTableHelper;
pub use types::MssqlTypeTranslater;
