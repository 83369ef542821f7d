//! Error types for the dialect toolkit.

use thiserror::Error;

use crate::pipeline::CreateTableReport;

/// Boxed adapter-level error, passed through without reinterpretation.
pub type AdapterError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for dialect operations.
#[derive(Error, Debug)]
pub enum DialectError {
    /// Configuration error (invalid YAML, unknown dialect name, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Table, column or database name violates the dialect's naming rules
    #[error("Naming error: {0}")]
    Naming(String),

    /// Bulk-load input column has no destination match
    #[error("Column '{column}' could not be found in destination table {table}")]
    ColumnMapping { column: String, table: String },

    /// Requested resize would shrink an existing column
    #[error("Resize error: {0}")]
    Resize(String),

    /// ALTER statement was sent but the adapter reported failure
    #[error("Failed to alter column using SQL: {sql}")]
    AlterFailed {
        sql: String,
        #[source]
        source: Box<DialectError>,
    },

    /// Opaque (untyped object) columns presented to table creation
    #[error("Cannot create columns for untyped values: {}", columns.join(", "))]
    UnsupportedValue { columns: Vec<String> },

    /// Proprietary type string matched no classification predicate
    #[error("Unknown proprietary type '{0}'")]
    UnknownType(String),

    /// Caller supplied arguments the operation cannot honour
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The dialect has no way to express the requested operation
    #[error("{operation} is not supported by {dialect}")]
    NotSupported { dialect: String, operation: String },

    /// Bulk insert failed; `detail` carries any row-level diagnosis
    #[error("Bulk insert failed: {detail}")]
    BulkInsertFailed {
        detail: String,
        #[source]
        source: Box<DialectError>,
    },

    /// Bulk insert failed and the diagnostic retry failed too
    #[error("Bulk insert failed: {original}; diagnostic retry also failed: {diagnostic}")]
    BulkInsertDiagnosticFailed {
        original: Box<DialectError>,
        diagnostic: Box<DialectError>,
    },

    /// The table was created but loading its data failed. `report` still
    /// carries the SQL that ran and the inferred column types.
    #[error("Table {} was created but loading its data failed: {source}", .report.table)]
    UploadAfterCreateFailed {
        report: Box<CreateTableReport>,
        #[source]
        source: Box<DialectError>,
    },

    /// Lower-level adapter error (driver, engine)
    #[error("Adapter error: {0}")]
    Adapter(#[source] AdapterError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DialectError {
    /// Create a Naming error
    pub fn naming(message: impl Into<String>) -> Self {
        DialectError::Naming(message.into())
    }

    /// Create a ColumnMapping error
    pub fn column_mapping(column: impl Into<String>, table: impl Into<String>) -> Self {
        DialectError::ColumnMapping {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Create a NotSupported error
    pub fn not_supported(dialect: impl Into<String>, operation: impl Into<String>) -> Self {
        DialectError::NotSupported {
            dialect: dialect.into(),
            operation: operation.into(),
        }
    }

    /// Wrap any driver error as an Adapter error
    pub fn adapter<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DialectError::Adapter(Box::new(err))
    }

    /// Wrap a failed ALTER with the SQL that was attempted
    pub fn alter_failed(sql: impl Into<String>, source: DialectError) -> Self {
        DialectError::AlterFailed {
            sql: sql.into(),
            source: Box::new(source),
        }
    }

    /// Returns the adapter error if this error (or the error it wraps) came from the adapter layer.
    pub fn adapter_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DialectError::Adapter(inner) => Some(inner.as_ref()),
            DialectError::AlterFailed { source, .. }
            | DialectError::BulkInsertFailed { source, .. }
            | DialectError::UploadAfterCreateFailed { source, .. } => source.adapter_source(),
            DialectError::BulkInsertDiagnosticFailed { original, .. } => original.adapter_source(),
            _ => None,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mapping_message_names_column_and_table() {
        let err = DialectError::column_mapping("BoB", "\"people\"");
        assert_eq!(
            err.to_string(),
            "Column 'BoB' could not be found in destination table \"people\""
        );
    }

    #[test]
    fn test_format_detailed_walks_chain() {
        let inner = DialectError::adapter(std::io::Error::new(
            std::io::ErrorKind::Other,
            "syntax error near ALTER",
        ));
        let err = DialectError::alter_failed("ALTER TABLE t ALTER COLUMN c int", inner);
        let detailed = err.format_detailed();
        assert!(detailed.contains("ALTER TABLE t ALTER COLUMN c int"));
        assert!(detailed.contains("Caused by:\n  1: Adapter error"));
        assert!(detailed.contains("2: syntax error near ALTER"));
    }

    #[test]
    fn test_adapter_source_through_alter_failed() {
        let inner = DialectError::adapter(std::io::Error::new(std::io::ErrorKind::TimedOut, "t"));
        let err = DialectError::alter_failed("x", inner);
        assert!(err.adapter_source().is_some());
        assert!(DialectError::naming("x").adapter_source().is_none());
    }

    #[test]
    fn test_unsupported_value_lists_columns() {
        let err = DialectError::UnsupportedValue {
            columns: vec!["blob".into(), "thing".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cannot create columns for untyped values: blob, thing"
        );
    }
}
