//! PostgreSQL type translation.

use crate::core::type_request::{TypeKind, TypeRequest};
use crate::dialect::{DatabaseType, TypeTranslater};

/// Widest `varchar(n)` PostgreSQL accepts.
const MAX_VARCHAR: u32 = 10_485_760;

/// PostgreSQL type translater.
#[derive(Debug, Clone, Default)]
pub struct PostgresTypeTranslater;

impl PostgresTypeTranslater {
    pub fn new() -> Self {
        Self
    }
}

impl TypeTranslater for PostgresTypeTranslater {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn max_string_width_before_max(&self) -> u32 {
        MAX_VARCHAR
    }

    fn bool_type(&self) -> String {
        "boolean".to_string()
    }

    // No single-byte integer type
    fn byte_type(&self) -> String {
        "smallint".to_string()
    }

    fn date_time_type(&self) -> String {
        "timestamp".to_string()
    }

    fn sized_string_type(&self, width: u32, _unicode: bool) -> String {
        format!("varchar({})", width)
    }

    fn unlimited_string_type(&self, _unicode: bool) -> String {
        "text".to_string()
    }

    fn byte_array_type(&self, _width: Option<u32>) -> String {
        "bytea".to_string()
    }

    fn guid_type(&self) -> String {
        "uuid".to_string()
    }

    fn is_unicode(&self, _proprietary: &str) -> bool {
        false
    }

    fn normalize(&self, request: &TypeRequest) -> TypeRequest {
        if request.kind == TypeKind::Byte {
            return TypeRequest::new(TypeKind::Int16);
        }
        let mut out = self.normalize_common(request);
        out.unicode = false;
        out
    }
}
