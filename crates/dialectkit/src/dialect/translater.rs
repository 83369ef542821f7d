//! Bidirectional mapping between [`TypeRequest`] and proprietary type strings.
//!
//! Each dialect implements [`TypeTranslater`]. Most behavior is provided by
//! default methods that define the algorithm skeleton:
//!
//! - `to_proprietary_type` dispatches on the request kind to small per-kind
//!   hooks (`int_type`, `sized_string_type`, ...) and applies the dialect's
//!   inline string ceilings.
//! - `to_type_request` runs an ordered battery of classification predicates
//!   (`is_bool`, `is_byte`, ...) and extracts width / decimal size.
//!
//! Dialects override the hooks and predicates that differ. Predicate order
//! matters: a dialect that spells booleans as `decimal(1,0)` must be asked
//! `is_bool` before anything looks at decimals.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::decimal_size::DecimalSize;
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::error::{DialectError, Result};

use super::DatabaseType;

/// Length reported for string types that have no enforced limit.
pub const UNLIMITED_LENGTH: i64 = i32::MAX as i64;

/// Length reported for types that are not strings.
pub const NOT_A_STRING: i64 = -1;

static BOOL_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(bit|bool|boolean)(\(1\))?$").unwrap());
static BYTE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tinyint(\(\d+\))?( unsigned)?$").unwrap());
static BYTE_ARRAY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(binary|varbinary|image|bytea|blob|tinyblob|mediumblob|longblob|raw|long raw)\b")
        .unwrap()
});
static SMALL_INT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(smallint|int2)(\(\d+\))?( unsigned)?$").unwrap());
static INT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(int|integer|int4|mediumint)(\(\d+\))?( unsigned)?$").unwrap()
});
static LONG_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(bigint|int8)(\(\d+\))?( unsigned)?$").unwrap());
static FLOAT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(float|real|double|double precision|float4|float8|binary_float|binary_double)(\(\d+\))?$",
    )
    .unwrap()
});
static DECIMAL_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(decimal|numeric|number|dec|money|smallmoney)\b").unwrap());
static DATE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(date|datetime|datetime2|smalldatetime|datetimeoffset|timestamp)\b").unwrap()
});
static TIME_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(time(\(\d+\))?( without time zone)?|interval\b.*)$").unwrap());
static STRING_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(char|text|clob|xml|json|^enum\b|^set\b|^string$|^character varying)").unwrap()
});
static UNLIMITED_STRING_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(text|ntext|tinytext|mediumtext|longtext|clob|nclob|xml|json|jsonb|long)$")
        .unwrap()
});
static GUID_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(uniqueidentifier|uuid)$").unwrap());
static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(\d+|max)\s*(?:(?:byte|char)\s*)?(?:,\s*(\d+)\s*)?\)").unwrap()
});

/// Lower-case and collapse whitespace so predicates see a canonical spelling.
pub fn canonical_type_name(proprietary: &str) -> String {
    proprietary
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Parse the `(n)` / `(p,s)` / `(max)` qualifier of a type string.
///
/// Returns `(first, second)`; `max` parses as `None` in the first slot with
/// `is_max = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeQualifier {
    pub first: Option<i64>,
    pub second: Option<i64>,
    pub is_max: bool,
}

pub fn parse_qualifier(proprietary: &str) -> TypeQualifier {
    let lower = canonical_type_name(proprietary);
    match QUALIFIER.captures(&lower) {
        Some(caps) => {
            let first = caps.get(1).map(|m| m.as_str());
            TypeQualifier {
                is_max: first == Some("max"),
                first: first.and_then(|s| s.parse().ok()),
                second: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            }
        }
        None => TypeQualifier::default(),
    }
}

/// Per-dialect bridge between portable requests and proprietary type strings.
pub trait TypeTranslater: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// Widest non-unicode string declared inline before the unlimited type is used.
    fn max_string_width_before_max(&self) -> u32;

    /// Widest unicode string declared inline before the unlimited type is used.
    fn max_unicode_string_width_before_max(&self) -> u32 {
        self.max_string_width_before_max()
    }

    /// Extra width to reserve per non-ASCII character when sizing strings.
    fn extra_length_per_non_ascii_character(&self) -> u32 {
        0
    }

    // =========================================================================
    // TypeRequest -> proprietary type
    // =========================================================================

    /// Narrowest proprietary type able to hold `request`. Never fails.
    fn to_proprietary_type(&self, request: &TypeRequest) -> String {
        match request.kind {
            TypeKind::Bool => self.bool_type(),
            TypeKind::Byte => self.byte_type(),
            TypeKind::Int16 => self.small_int_type(),
            TypeKind::Int32 => self.int_type(),
            TypeKind::Int64 => self.big_int_type(),
            TypeKind::Decimal => self.decimal_type(request.decimal_size.as_ref()),
            TypeKind::DateTime => self.date_time_type(),
            TypeKind::TimeSpan => self.time_type(),
            TypeKind::String => self.string_type(request.width, request.unicode),
            TypeKind::ByteArray => self.byte_array_type(request.width),
            TypeKind::Guid => self.guid_type(),
        }
    }

    fn bool_type(&self) -> String {
        "bit".to_string()
    }

    fn byte_type(&self) -> String {
        "tinyint".to_string()
    }

    fn small_int_type(&self) -> String {
        "smallint".to_string()
    }

    fn int_type(&self) -> String {
        "int".to_string()
    }

    fn big_int_type(&self) -> String {
        "bigint".to_string()
    }

    /// `decimal(p,s)`, or `decimal(20,10)` when no size is known.
    fn decimal_type(&self, size: Option<&DecimalSize>) -> String {
        match size {
            Some(s) if !s.is_empty() => format!("decimal({},{})", s.precision(), s.scale()),
            _ => "decimal(20,10)".to_string(),
        }
    }

    fn date_time_type(&self) -> String {
        "datetime".to_string()
    }

    fn time_type(&self) -> String {
        "time".to_string()
    }

    fn string_type(&self, width: Option<u32>, unicode: bool) -> String {
        let ceiling = if unicode {
            self.max_unicode_string_width_before_max()
        } else {
            self.max_string_width_before_max()
        };
        match width {
            Some(w) if w <= ceiling => self.sized_string_type(w.max(1), unicode),
            _ => self.unlimited_string_type(unicode),
        }
    }

    fn sized_string_type(&self, width: u32, unicode: bool) -> String {
        if unicode {
            format!("nvarchar({})", width)
        } else {
            format!("varchar({})", width)
        }
    }

    fn unlimited_string_type(&self, unicode: bool) -> String;

    fn byte_array_type(&self, width: Option<u32>) -> String;

    fn guid_type(&self) -> String;

    // =========================================================================
    // Proprietary type -> TypeRequest
    // =========================================================================

    /// Parse a proprietary type string into a portable request.
    fn to_type_request(&self, proprietary: &str) -> Result<TypeRequest> {
        let kind = self
            .classify(proprietary)
            .ok_or_else(|| DialectError::UnknownType(proprietary.to_string()))?;

        let mut request = TypeRequest::new(kind);
        match kind {
            TypeKind::String => {
                let len = self.get_length_if_string(proprietary);
                request.width = if len == UNLIMITED_LENGTH || len < 0 {
                    None
                } else {
                    Some(len as u32)
                };
                request.unicode = self.is_unicode(proprietary);
            }
            TypeKind::ByteArray => request.width = self.get_byte_array_width(proprietary),
            TypeKind::Decimal => request.decimal_size = self.get_decimal_size(proprietary),
            _ => {}
        }
        Ok(request)
    }

    /// Run the ordered predicate battery.
    fn classify(&self, proprietary: &str) -> Option<TypeKind> {
        let t = canonical_type_name(proprietary);
        if self.is_bool(&t) {
            Some(TypeKind::Bool)
        } else if self.is_byte(&t) {
            Some(TypeKind::Byte)
        } else if self.is_byte_array(&t) {
            Some(TypeKind::ByteArray)
        } else if self.is_small_int(&t) {
            Some(TypeKind::Int16)
        } else if self.is_int(&t) {
            Some(TypeKind::Int32)
        } else if self.is_long(&t) {
            Some(TypeKind::Int64)
        } else if self.is_floating_point(&t) || self.is_decimal(&t) {
            Some(TypeKind::Decimal)
        } else if self.is_date(&t) {
            Some(TypeKind::DateTime)
        } else if self.is_time(&t) {
            Some(TypeKind::TimeSpan)
        } else if self.is_guid(&t) {
            Some(TypeKind::Guid)
        } else if self.is_string(&t) {
            Some(TypeKind::String)
        } else {
            None
        }
    }

    // Predicates receive the canonical (lower-case, single-spaced) type name.

    fn is_bool(&self, t: &str) -> bool {
        BOOL_TYPE.is_match(t)
    }

    fn is_byte(&self, t: &str) -> bool {
        BYTE_TYPE.is_match(t)
    }

    fn is_byte_array(&self, t: &str) -> bool {
        BYTE_ARRAY_TYPE.is_match(t)
    }

    fn is_small_int(&self, t: &str) -> bool {
        SMALL_INT_TYPE.is_match(t)
    }

    fn is_int(&self, t: &str) -> bool {
        INT_TYPE.is_match(t)
    }

    fn is_long(&self, t: &str) -> bool {
        LONG_TYPE.is_match(t)
    }

    fn is_floating_point(&self, t: &str) -> bool {
        FLOAT_TYPE.is_match(t)
    }

    fn is_decimal(&self, t: &str) -> bool {
        DECIMAL_TYPE.is_match(t)
    }

    fn is_date(&self, t: &str) -> bool {
        DATE_TYPE.is_match(t)
    }

    fn is_time(&self, t: &str) -> bool {
        TIME_TYPE.is_match(t)
    }

    fn is_string(&self, t: &str) -> bool {
        STRING_TYPE.is_match(t)
    }

    fn is_guid(&self, t: &str) -> bool {
        GUID_TYPE.is_match(t)
    }

    fn is_unicode(&self, proprietary: &str) -> bool {
        let t = canonical_type_name(proprietary);
        t.starts_with('n') || t.starts_with("national")
    }

    /// Whether a string type has no enforced width.
    fn is_unlimited_string(&self, t: &str) -> bool {
        UNLIMITED_STRING_TYPE.is_match(t)
    }

    /// Declared width of a string type.
    ///
    /// [`NOT_A_STRING`] for non-strings, [`UNLIMITED_LENGTH`] for types with
    /// no enforced limit.
    fn get_length_if_string(&self, proprietary: &str) -> i64 {
        if self.classify(proprietary) != Some(TypeKind::String) {
            return NOT_A_STRING;
        }
        let t = canonical_type_name(proprietary);
        if self.is_unlimited_string(&t) {
            return UNLIMITED_LENGTH;
        }
        let q = parse_qualifier(&t);
        if q.is_max {
            return UNLIMITED_LENGTH;
        }
        match q.first {
            Some(n) => n,
            None if t == "char" || t == "nchar" || t == "character" => 1,
            None => UNLIMITED_LENGTH,
        }
    }

    /// Declared length of a binary type, `None` if unlimited.
    fn get_byte_array_width(&self, proprietary: &str) -> Option<u32> {
        let q = parse_qualifier(proprietary);
        if q.is_max {
            None
        } else {
            q.first.map(|n| n.clamp(0, u32::MAX as i64) as u32)
        }
    }

    /// Precision/scale of a fixed-point type; `None` for anything else.
    fn get_decimal_size(&self, proprietary: &str) -> Option<DecimalSize> {
        let t = canonical_type_name(proprietary);
        if !self.is_decimal(&t) {
            return None;
        }
        let q = parse_qualifier(&t);
        q.first
            .map(|p| DecimalSize::from_precision_scale(p, q.second.unwrap_or(0)))
    }

    // =========================================================================
    // Round-trip normalization
    // =========================================================================

    /// Collapse `request` to the form this dialect can actually store, so that
    /// `to_type_request(to_proprietary_type(r)) == normalize(r)`.
    fn normalize(&self, request: &TypeRequest) -> TypeRequest {
        self.normalize_common(request)
    }

    /// Normalization shared by every dialect. Overrides of `normalize` start here.
    fn normalize_common(&self, request: &TypeRequest) -> TypeRequest {
        let mut out = TypeRequest::new(request.kind);
        match request.kind {
            TypeKind::String => {
                let ceiling = if request.unicode {
                    self.max_unicode_string_width_before_max()
                } else {
                    self.max_string_width_before_max()
                };
                out.unicode = request.unicode;
                out.width = match request.width {
                    Some(w) if w <= ceiling => Some(w.max(1)),
                    _ => None,
                };
            }
            TypeKind::Decimal => {
                out.decimal_size = Some(match request.decimal_size {
                    Some(d) if !d.is_empty() => d,
                    _ => DecimalSize::new(10, 10),
                });
            }
            _ => {}
        }
        out
    }
}
