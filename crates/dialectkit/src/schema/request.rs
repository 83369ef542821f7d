//! Column requests: what a caller wants a new column to look like.

use serde::{Deserialize, Serialize};

use crate::core::type_request::TypeRequest;
use crate::dialect::{ScalarFunction, TypeTranslater};
use crate::error::{DialectError, Result};

/// Default value expression for a new column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    #[default]
    None,
    Now,
    NewGuid,
}

impl ColumnDefault {
    pub fn scalar_function(self) -> Option<ScalarFunction> {
        match self {
            ColumnDefault::None => None,
            ColumnDefault::Now => Some(ScalarFunction::Now),
            ColumnDefault::NewGuid => Some(ScalarFunction::NewGuid),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A column to create.
///
/// Carries either a portable [`TypeRequest`] or an explicit proprietary type
/// string. When both are present the explicit string wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRequest {
    pub name: String,

    #[serde(default)]
    pub type_request: Option<TypeRequest>,

    #[serde(default)]
    pub explicit_type: Option<String>,

    #[serde(default = "default_true")]
    pub allow_nulls: bool,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_auto_increment: bool,

    #[serde(default)]
    pub default: ColumnDefault,

    #[serde(default)]
    pub collation: Option<String>,
}

impl ColumnRequest {
    /// A nullable column of the given portable type.
    pub fn new(name: impl Into<String>, type_request: TypeRequest) -> Self {
        Self {
            name: name.into(),
            type_request: Some(type_request),
            explicit_type: None,
            allow_nulls: true,
            is_primary_key: false,
            is_auto_increment: false,
            default: ColumnDefault::None,
            collation: None,
        }
    }

    /// A nullable column declared with a proprietary type string.
    pub fn with_explicit_type(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            type_request: None,
            explicit_type: Some(sql_type.into()),
            ..Self::new(name, TypeRequest::unlimited_string())
        }
    }

    pub fn not_null(mut self) -> Self {
        self.allow_nulls = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default = default;
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Nullability as it will be declared: primary keys are never nullable.
    pub fn effective_allow_nulls(&self) -> bool {
        self.allow_nulls && !self.is_primary_key
    }

    /// The portable type of this column, reverse-translating an explicit
    /// type string when one is set.
    pub fn resolve_type_request(&self, translater: &dyn TypeTranslater) -> Result<TypeRequest> {
        match (&self.explicit_type, &self.type_request) {
            (Some(sql_type), _) => translater.to_type_request(sql_type),
            (None, Some(request)) => Ok(request.clone()),
            (None, None) => Err(self.missing_type()),
        }
    }

    /// The proprietary type to declare. Explicit strings are used verbatim.
    pub fn proprietary_type(&self, translater: &dyn TypeTranslater) -> Result<String> {
        match (&self.explicit_type, &self.type_request) {
            (Some(sql_type), _) => Ok(sql_type.clone()),
            (None, Some(request)) => Ok(translater.to_proprietary_type(request)),
            (None, None) => Err(self.missing_type()),
        }
    }

    fn missing_type(&self) -> DialectError {
        DialectError::InvalidArgument(format!(
            "Column request '{}' has neither a type request nor an explicit type",
            self.name
        ))
    }
}
