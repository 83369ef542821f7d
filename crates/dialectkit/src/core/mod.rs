//! Core abstractions shared by every dialect.
//!
//! This module provides the foundational types and traits used throughout
//! the toolkit:
//!
//! - [`decimal_size`] and [`type_request`]: the portable type model
//! - [`value`] and [`dataset`]: SQL values and the loosely typed record set
//! - [`identifier`]: naming validation and identifier-safe name derivation
//! - [`keywords`]: the process-wide connection keyword registry
//! - [`traits`]: execution seams (connections, schema/data adapters, guessers)
//! - [`catalog`]: dialect registry for lookup by name
//!
//! # Architecture
//!
//! The core defines engine-agnostic abstractions that the dialect strategies
//! in `drivers/*` and the adapters plug into. This separation enables:
//!
//! - **Extensibility**: New engines can be added without modifying core code
//! - **Testability**: Core logic can be tested with in-memory implementations
//!
//! # Design Patterns
//!
//! - **Registry**: `DialectCatalog` and `KeywordRegistry` hand out per-dialect state
//! - **Strategy**: adapters and guessers are interchangeable algorithms
//! - **Template Method**: Default trait method implementations define algorithm skeletons

pub mod catalog;
pub mod dataset;
pub mod decimal_size;
pub mod identifier;
pub mod keywords;
pub mod traits;
pub mod type_request;
pub mod value;

// Re-export commonly used types for convenience
pub use catalog::DialectCatalog;
pub use dataset::{DataColumn, DataSet, ValueKind};
pub use decimal_size::DecimalSize;
pub use keywords::{Keyword, KeywordAccumulator, KeywordPriority, KeywordRegistry};
pub use traits::{
    BulkInsertRequest, ColumnInfo, Command, DataAdapter, DbConnection, GuessSettings,
    SchemaAdapter, TableInfo, TableRef, TypeGuesser, DEFAULT_TIMEOUT_SECS,
};
pub use type_request::{TypeKind, TypeRequest};
pub use value::SqlValue;
