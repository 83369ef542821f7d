//! Oracle type translation.
//!
//! Integer kinds are `number(1|3|5|10|19)` and must be classified before the
//! generic decimal predicate. Strings are `varchar2`/`nvarchar2` up to the
//! inline ceiling, then `clob`/`nclob`.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::decimal_size::DecimalSize;
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::dialect::{DatabaseType, TypeTranslater};

const MAX_VARCHAR2: u32 = 4000;
const MAX_NVARCHAR2: u32 = 2000;

static INTEGER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:number|numeric|decimal)\((\d+)(?:,\s*0)?\)$").unwrap());

/// Precision Oracle uses for each integer-like kind.
fn integer_precision(kind: TypeKind) -> Option<u32> {
    match kind {
        TypeKind::Bool => Some(1),
        TypeKind::Byte => Some(3),
        TypeKind::Int16 => Some(5),
        TypeKind::Int32 => Some(10),
        TypeKind::Int64 => Some(19),
        _ => None,
    }
}

/// Integer-like kind for a `number(p)` / `number(p,0)` precision.
fn integer_kind(precision: u32) -> Option<TypeKind> {
    match precision {
        1 => Some(TypeKind::Bool),
        3 => Some(TypeKind::Byte),
        5 => Some(TypeKind::Int16),
        10 | 38 => Some(TypeKind::Int32),
        19 => Some(TypeKind::Int64),
        _ => None,
    }
}

fn integer_kind_of(t: &str) -> Option<TypeKind> {
    INTEGER_NUMBER
        .captures(t)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .and_then(integer_kind)
}

/// Oracle type translater.
#[derive(Debug, Clone, Default)]
pub struct OracleTypeTranslater;

impl OracleTypeTranslater {
    pub fn new() -> Self {
        Self
    }

    fn number(kind: TypeKind) -> String {
        format!("number({})", integer_precision(kind).unwrap_or(38))
    }
}

impl TypeTranslater for OracleTypeTranslater {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Oracle
    }

    fn max_string_width_before_max(&self) -> u32 {
        MAX_VARCHAR2
    }

    fn max_unicode_string_width_before_max(&self) -> u32 {
        MAX_NVARCHAR2
    }

    fn extra_length_per_non_ascii_character(&self) -> u32 {
        2
    }

    fn bool_type(&self) -> String {
        Self::number(TypeKind::Bool)
    }

    fn byte_type(&self) -> String {
        Self::number(TypeKind::Byte)
    }

    fn small_int_type(&self) -> String {
        Self::number(TypeKind::Int16)
    }

    fn int_type(&self) -> String {
        Self::number(TypeKind::Int32)
    }

    fn big_int_type(&self) -> String {
        Self::number(TypeKind::Int64)
    }

    fn decimal_type(&self, size: Option<&DecimalSize>) -> String {
        match size {
            Some(s) if !s.is_empty() => format!("number({},{})", s.precision(), s.scale()),
            _ => "number(20,10)".to_string(),
        }
    }

    fn date_time_type(&self) -> String {
        "date".to_string()
    }

    fn time_type(&self) -> String {
        "interval day to second".to_string()
    }

    fn sized_string_type(&self, width: u32, unicode: bool) -> String {
        if unicode {
            format!("nvarchar2({})", width)
        } else {
            format!("varchar2({})", width)
        }
    }

    fn unlimited_string_type(&self, unicode: bool) -> String {
        if unicode {
            "nclob".to_string()
        } else {
            "clob".to_string()
        }
    }

    fn byte_array_type(&self, _width: Option<u32>) -> String {
        "blob".to_string()
    }

    fn guid_type(&self) -> String {
        "varchar2(36)".to_string()
    }

    fn is_bool(&self, t: &str) -> bool {
        integer_kind_of(t) == Some(TypeKind::Bool)
    }

    fn is_byte(&self, t: &str) -> bool {
        integer_kind_of(t) == Some(TypeKind::Byte)
    }

    fn is_small_int(&self, t: &str) -> bool {
        integer_kind_of(t) == Some(TypeKind::Int16)
    }

    fn is_int(&self, t: &str) -> bool {
        matches!(t, "int" | "integer" | "number(*,0)")
            || integer_kind_of(t) == Some(TypeKind::Int32)
    }

    fn is_long(&self, t: &str) -> bool {
        integer_kind_of(t) == Some(TypeKind::Int64)
    }

    fn is_string(&self, t: &str) -> bool {
        t == "long" || t.starts_with("varchar2") || t.starts_with("nvarchar2") || {
            let base = t.split('(').next().unwrap_or(t);
            matches!(base, "char" | "nchar" | "clob" | "nclob" | "varchar" | "nvarchar")
        }
    }

    fn normalize(&self, request: &TypeRequest) -> TypeRequest {
        match request.kind {
            TypeKind::Guid => TypeRequest::string(36),
            TypeKind::Decimal => {
                let kind = request
                    .decimal_size
                    .filter(|d| d.scale() == 0)
                    .and_then(|d| integer_kind(d.precision()));
                match kind {
                    Some(kind) => TypeRequest::new(kind),
                    None => self.normalize_common(request),
                }
            }
            _ => self.normalize_common(request),
        }
    }
}
