//! SQLite type translation.
//!
//! SQLite stores whatever type name it is given and derives an affinity from
//! it, so the translater declares conventional names that read back cleanly.

use crate::dialect::{DatabaseType, TypeTranslater};

const MAX_VARCHAR: u32 = 8000;

/// SQLite type translater.
#[derive(Debug, Clone, Default)]
pub struct SqliteTypeTranslater;

impl SqliteTypeTranslater {
    pub fn new() -> Self {
        Self
    }
}

impl TypeTranslater for SqliteTypeTranslater {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn max_string_width_before_max(&self) -> u32 {
        MAX_VARCHAR
    }

    fn bool_type(&self) -> String {
        "boolean".to_string()
    }

    fn unlimited_string_type(&self, unicode: bool) -> String {
        if unicode {
            "ntext".to_string()
        } else {
            "text".to_string()
        }
    }

    fn byte_array_type(&self, _width: Option<u32>) -> String {
        "blob".to_string()
    }

    fn guid_type(&self) -> String {
        "uniqueidentifier".to_string()
    }
}
