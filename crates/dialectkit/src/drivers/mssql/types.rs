//! MSSQL type translation.

use crate::core::type_request::{TypeKind, TypeRequest};
use crate::dialect::{DatabaseType, TypeTranslater};

const MAX_VARCHAR: u32 = 8000;
const MAX_NVARCHAR: u32 = 4000;
const MAX_VARBINARY: u32 = 8000;

/// SQL Server type translater.
#[derive(Debug, Clone, Default)]
pub struct MssqlTypeTranslater;

impl MssqlTypeTranslater {
    pub fn new() -> Self {
        Self
    }
}

impl TypeTranslater for MssqlTypeTranslater {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    fn max_string_width_before_max(&self) -> u32 {
        MAX_VARCHAR
    }

    fn max_unicode_string_width_before_max(&self) -> u32 {
        MAX_NVARCHAR
    }

    fn date_time_type(&self) -> String {
        "datetime2".to_string()
    }

    fn unlimited_string_type(&self, unicode: bool) -> String {
        if unicode {
            "nvarchar(max)".to_string()
        } else {
            "varchar(max)".to_string()
        }
    }

    fn byte_array_type(&self, width: Option<u32>) -> String {
        match width {
            Some(w) if w <= MAX_VARBINARY => format!("varbinary({})", w.max(1)),
            _ => "varbinary(max)".to_string(),
        }
    }

    fn guid_type(&self) -> String {
        "uniqueidentifier".to_string()
    }

    fn normalize(&self, request: &TypeRequest) -> TypeRequest {
        let mut out = self.normalize_common(request);
        if request.kind == TypeKind::ByteArray {
            out.width = request.width.filter(|w| *w <= MAX_VARBINARY).map(|w| w.max(1));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decimal_size::DecimalSize;

    #[test]
    fn test_string_ceilings() {
        let t = MssqlTypeTranslater::new();
        assert_eq!(t.to_proprietary_type(&TypeRequest::string(8000)), "varchar(8000)");
        assert_eq!(t.to_proprietary_type(&TypeRequest::string(8001)), "varchar(max)");
        assert_eq!(
            t.to_proprietary_type(&TypeRequest::string(4000).with_unicode(true)),
            "nvarchar(4000)"
        );
        assert_eq!(
            t.to_proprietary_type(&TypeRequest::string(4001).with_unicode(true)),
            "nvarchar(max)"
        );
    }

    #[test]
    fn test_reverse_translation() {
        let t = MssqlTypeTranslater::new();
        let r = t.to_type_request("nvarchar(max)").unwrap();
        assert_eq!(r.kind, TypeKind::String);
        assert_eq!(r.width, None);
        assert!(r.unicode);

        assert_eq!(t.to_type_request("bit").unwrap().kind, TypeKind::Bool);
        assert_eq!(t.to_type_request("uniqueidentifier").unwrap().kind, TypeKind::Guid);
        assert_eq!(t.to_type_request("datetime2").unwrap().kind, TypeKind::DateTime);
        assert_eq!(t.to_type_request("varbinary(16)").unwrap().width, Some(16));
    }

    #[test]
    fn test_length_if_string() {
        let t = MssqlTypeTranslater::new();
        assert_eq!(t.get_length_if_string("varchar(max)"), i32::MAX as i64);
        assert_eq!(t.get_length_if_string("nvarchar(10)"), 10);
        assert_eq!(t.get_length_if_string("int"), -1);
    }

    #[test]
    fn test_decimal_round_trip() {
        let t = MssqlTypeTranslater::new();
        let r = TypeRequest::decimal(DecimalSize::new(3, 1));
        assert_eq!(t.to_proprietary_type(&r), "decimal(4,1)");
        assert_eq!(t.to_type_request("decimal(4,1)").unwrap(), r);
    }

    #[test]
    fn test_byte_array_round_trip() {
        let t = MssqlTypeTranslater::new();
        for r in [TypeRequest::byte_array(Some(50)), TypeRequest::byte_array(Some(9000))] {
            let back = t.to_type_request(&t.to_proprietary_type(&r)).unwrap();
            assert_eq!(back, t.normalize(&r));
        }
    }
}
