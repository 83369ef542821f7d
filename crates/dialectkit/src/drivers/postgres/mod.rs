//! PostgreSQL dialect.
//!
//! - [`PostgresSyntax`]: double-quote quoting, `:name` parameters, `"db"."public"."t"`
//! - [`PostgresTypeTranslater`]: `varchar(n)` up to 10485760, `text`, `boolean`
//! - [`PostgresTableHelper`]: `ALTER COLUMN ... TYPE`, `lastval()`

mod dialect;
mod table;
mod types;

pub use dialect::PostgresSyntax;
pub use table::PostgresTableHelper;
pub use types::PostgresTypeTranslater;
