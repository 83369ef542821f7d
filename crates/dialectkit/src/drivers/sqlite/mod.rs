//! SQLite dialect and reference adapter.
//!
//! - [`SqliteSyntax`], [`SqliteTypeTranslater`], [`SqliteTableHelper`]: the
//!   SQL-text strategies, always available
//! - [`SqliteAdapter`] / [`SqliteConnection`]: a `rusqlite`-backed
//!   [`SchemaAdapter`](crate::core::traits::SchemaAdapter) and
//!   [`DataAdapter`](crate::core::traits::DataAdapter) (feature `sqlite`)
//!
//! SQLite has a single schema per attached file, named `main`; it is the
//! database name every discovered object uses.

#[cfg(feature = "sqlite")]
mod adapter;
mod dialect;
mod table;
mod types;

#[cfg(feature = "sqlite")]
pub use adapter::{SqliteAdapter, SqliteConnection};
pub use dialect::SqliteSyntax;
pub use table::SqliteTableHelper;
pub use types::SqliteTypeTranslater;

/// Name SQLite gives the primary database of a connection.
pub const MAIN_DATABASE: &str = "main";
