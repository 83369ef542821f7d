//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::core::keywords::KeywordPriority;
use crate::core::traits::DEFAULT_TIMEOUT_SECS;
use crate::guess::Culture;
use crate::pipeline::DEFAULT_BATCH_SEPARATOR;
use crate::transfer::DEFAULT_DATE_SAMPLE_SIZE;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Table creation defaults.
    #[serde(default)]
    pub create_table: CreateTableConfig,

    /// Bulk load defaults.
    #[serde(default)]
    pub bulk_load: BulkLoadConfig,

    /// Connection keywords installed into the process-wide registry.
    #[serde(default)]
    pub keywords: Vec<KeywordConfig>,
}

/// Table creation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableConfig {
    /// Line that splits generated scripts into batches (default: "GO").
    #[serde(default = "default_batch_separator")]
    pub batch_separator: String,

    /// Per-batch timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,

    /// Rows sampled per column when guessing types. All rows if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rows: Option<usize>,
}

impl Default for CreateTableConfig {
    fn default() -> Self {
        Self {
            batch_separator: default_batch_separator(),
            timeout_secs: default_timeout_secs(),
            sample_rows: None,
        }
    }
}

/// Bulk load configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkLoadConfig {
    /// Upload timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,

    /// Skip input columns with no destination instead of failing (default: false).
    #[serde(default)]
    pub allow_unmatched_input_columns: bool,

    /// Values sampled to settle a column's date order (default: 500).
    #[serde(default = "default_date_sample_size")]
    pub date_sample_size: usize,

    /// Culture used to read ambiguous dates (default: "en-US").
    #[serde(default = "default_culture")]
    pub culture: Culture,
}

impl Default for BulkLoadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            allow_unmatched_input_columns: false,
            date_sample_size: default_date_sample_size(),
            culture: default_culture(),
        }
    }
}

/// One connection keyword for one dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Dialect name or alias ("mssql", "pg", ...).
    pub dialect: String,

    pub keyword: String,

    pub value: String,

    /// Priority of the setting (default: api_rule).
    #[serde(default = "default_priority")]
    pub priority: KeywordPriority,
}

fn default_batch_separator() -> String {
    DEFAULT_BATCH_SEPARATOR.to_string()
}

fn default_timeout_secs() -> u32 {
    DEFAULT_TIMEOUT_SECS
}

fn default_date_sample_size() -> usize {
    DEFAULT_DATE_SAMPLE_SIZE
}

fn default_culture() -> Culture {
    Culture::EnUs
}

fn default_priority() -> KeywordPriority {
    KeywordPriority::ApiRule
}
