//! MySQL type translation.
//!
//! MySQL reports every character type without a unicode marker and stores
//! GUIDs as `char(36)`, so both collapse during normalization.

use crate::core::type_request::{TypeKind, TypeRequest};
use crate::dialect::{DatabaseType, TypeTranslater};

const MAX_VARCHAR: u32 = 4000;

/// MySQL/MariaDB type translater.
#[derive(Debug, Clone, Default)]
pub struct MysqlTypeTranslater;

impl MysqlTypeTranslater {
    pub fn new() -> Self {
        Self
    }
}

impl TypeTranslater for MysqlTypeTranslater {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn max_string_width_before_max(&self) -> u32 {
        MAX_VARCHAR
    }

    fn sized_string_type(&self, width: u32, _unicode: bool) -> String {
        format!("varchar({})", width)
    }

    fn unlimited_string_type(&self, _unicode: bool) -> String {
        "longtext".to_string()
    }

    fn byte_array_type(&self, _width: Option<u32>) -> String {
        "longblob".to_string()
    }

    fn guid_type(&self) -> String {
        "char(36)".to_string()
    }

    fn is_bool(&self, t: &str) -> bool {
        matches!(t, "bit" | "bit(1)" | "bool" | "boolean" | "tinyint(1)")
    }

    fn is_unicode(&self, _proprietary: &str) -> bool {
        false
    }

    fn normalize(&self, request: &TypeRequest) -> TypeRequest {
        if request.kind == TypeKind::Guid {
            return TypeRequest::string(36);
        }
        let mut out = self.normalize_common(request);
        out.unicode = false;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_strings_collapse() {
        let t = MysqlTypeTranslater::new();
        let r = TypeRequest::string(10).with_unicode(true);
        assert_eq!(t.to_proprietary_type(&r), "varchar(10)");
        assert_eq!(t.to_type_request("varchar(10)").unwrap(), t.normalize(&r));
    }

    #[test]
    fn test_long_strings_use_longtext() {
        let t = MysqlTypeTranslater::new();
        assert_eq!(t.to_proprietary_type(&TypeRequest::string(4001)), "longtext");
        assert_eq!(t.get_length_if_string("longtext"), i32::MAX as i64);
    }

    #[test]
    fn test_tinyint_one_is_bool() {
        let t = MysqlTypeTranslater::new();
        assert_eq!(t.to_type_request("tinyint(1)").unwrap().kind, TypeKind::Bool);
        assert_eq!(t.to_type_request("tinyint(4)").unwrap().kind, TypeKind::Byte);
        assert_eq!(t.to_type_request("BIT").unwrap().kind, TypeKind::Bool);
    }

    #[test]
    fn test_guid_round_trips_as_string() {
        let t = MysqlTypeTranslater::new();
        let r = TypeRequest::new(TypeKind::Guid);
        let back = t.to_type_request(&t.to_proprietary_type(&r)).unwrap();
        assert_eq!(back, TypeRequest::string(36));
        assert_eq!(back, t.normalize(&r));
    }
}
