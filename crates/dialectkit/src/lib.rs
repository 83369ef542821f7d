//! # dialectkit
//!
//! Database-engine-agnostic schema and data toolkit.
//!
//! This library lets the same code describe, create and load tables on
//! different SQL engines with support for:
//!
//! - **Portable types** via [`TypeRequest`] and per-dialect translaters
//! - **Dialect syntax** for quoting, qualification, parameters and aliases
//! - **Table creation** from explicit column requests or sampled data
//! - **Bulk load** with case-insensitive column mapping and date coercion
//! - **Schema changes** such as resize, add/drop column and make-distinct
//!
//! Physical drivers plug in through [`SchemaAdapter`] and [`DataAdapter`].
//! A reference SQLite adapter ships behind the `sqlite` feature.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dialectkit::{CreateTableArgs, DataColumn, DataSet, DiscoveredServer};
//!
//! fn main() -> dialectkit::Result<()> {
//!     let server = DiscoveredServer::sqlite("people.db");
//!     let database = server.expect_database("main");
//!
//!     let mut data = DataSet::new("people")
//!         .with_column(DataColumn::text("name"))
//!         .with_column(DataColumn::text("height"));
//!     data.push_row(["dave", "1.82"])?;
//!
//!     let table = database.create_table(CreateTableArgs::new("people").with_data(&data))?;
//!     println!("Loaded {} rows", table.row_count(None)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod guess;
pub mod pipeline;
pub mod schema;
pub mod transfer;

// Re-exports for convenient access
pub use crate::core::{
    DataAdapter, DataColumn, DataSet, DecimalSize, DialectCatalog, KeywordPriority,
    KeywordRegistry, SchemaAdapter, SqlValue, TypeGuesser, TypeKind, TypeRequest, ValueKind,
};
pub use config::{BulkLoadConfig, Config, CreateTableConfig, KeywordConfig};
pub use dialect::{DatabaseType, Dialect, QuerySyntax, TableHelper, TypeTranslater};
pub use error::{DialectError, Result};
pub use guess::{BasicGuesser, Culture};
pub use pipeline::{plan_create_table, CreateTableArgs, CreateTablePlan, CreateTableReport};
pub use schema::{
    ColumnRequest, DiscoveredColumn, DiscoveredDatabase, DiscoveredServer, DiscoveredTable,
    ManagedTransaction, Relationship, TableType,
};
pub use transfer::{BulkLoadSession, UploadStats};
