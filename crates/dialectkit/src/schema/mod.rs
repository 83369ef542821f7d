//! Portable schema object model.
//!
//! Discovered objects are cheap identity handles: constructing a
//! [`DiscoveredServer`], [`DiscoveredDatabase`] or [`DiscoveredTable`] never
//! touches the engine, and "might not exist" is a normal state until
//! `exists()` is asked. Each object carries the [`Dialect`](crate::dialect::Dialect)
//! strategies and the adapters it was discovered through, so type-aware
//! operations (resize, alter, insert) need nothing else.
//!
//! # Design Patterns
//!
//! - **Handle objects**: identity plus capabilities, no cached rows
//! - **RAII**: [`ManagedTransaction`] rolls back unless explicitly finished

mod column;
mod database;
mod relationship;
mod request;
mod server;
mod table;
mod transaction;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use column::{DiscoveredColumn, DiscoveredDataType};
pub use database::DiscoveredDatabase;
pub use relationship::{CascadeRule, Relationship};
pub use request::{ColumnDefault, ColumnRequest};
pub use server::DiscoveredServer;
pub use table::DiscoveredTable;
pub use transaction::ManagedTransaction;

/// Kind of table-like object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    #[default]
    Table,
    View,
    TableValuedFunction,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableType::Table => "table",
            TableType::View => "view",
            TableType::TableValuedFunction => "table-valued function",
        })
    }
}
