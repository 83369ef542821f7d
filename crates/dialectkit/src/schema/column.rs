//! Discovered columns and their data types.
//!
//! A [`DiscoveredDataType`] wraps the proprietary type string the catalog
//! reported and derives everything portable from it on demand through the
//! dialect's [`TypeTranslater`](crate::dialect::TypeTranslater). Resizing and
//! altering go through the dialect's
//! [`TableHelper`](crate::dialect::TableHelper); the cached type string only
//! changes once every ALTER statement has succeeded.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::core::decimal_size::DecimalSize;
use crate::core::traits::{ColumnInfo, Command};
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::dialect::NOT_A_STRING;
use crate::error::{DialectError, Result};

use super::table::DiscoveredTable;
use super::transaction::{with_connection, ManagedTransaction};

/// A column of a [`DiscoveredTable`] as the catalog describes it.
#[derive(Debug, Clone)]
pub struct DiscoveredColumn {
    name: String,
    pub allow_nulls: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub collation: Option<String>,
    data_type: DiscoveredDataType,
}

impl DiscoveredColumn {
    pub(crate) fn from_info(table: &DiscoveredTable, info: ColumnInfo) -> Self {
        let data_type = DiscoveredDataType {
            sql_type: info.data_type,
            attributes: info.attributes,
            table: table.clone(),
            column: info.name.clone(),
            allow_nulls: info.allow_nulls,
        };
        Self {
            name: info.name,
            allow_nulls: info.allow_nulls,
            is_primary_key: info.is_primary_key,
            is_auto_increment: info.is_auto_increment,
            collation: info.collation,
            data_type,
        }
    }

    /// Unqualified column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DiscoveredTable {
        &self.data_type.table
    }

    pub fn data_type(&self) -> &DiscoveredDataType {
        &self.data_type
    }

    pub fn data_type_mut(&mut self) -> &mut DiscoveredDataType {
        &mut self.data_type
    }

    pub fn wrapped_name(&self) -> Result<String> {
        self.table().dialect().syntax().wrap(&self.name)
    }

    pub fn fully_qualified_name(&self) -> Result<String> {
        let table = self.table();
        table.dialect().syntax().fully_qualify_column(
            table.database().name(),
            table.schema(),
            table.name(),
            &self.name,
        )
    }
}

impl PartialEq for DiscoveredColumn {
    fn eq(&self, other: &Self) -> bool {
        self.table() == other.table() && self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// Proprietary type of a discovered column plus raw catalog attributes.
#[derive(Debug, Clone)]
pub struct DiscoveredDataType {
    sql_type: String,
    attributes: BTreeMap<String, String>,
    table: DiscoveredTable,
    column: String,
    allow_nulls: bool,
}

impl DiscoveredDataType {
    /// The proprietary type string, e.g. `varchar(10)`.
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn type_request(&self) -> Result<TypeRequest> {
        self.table
            .dialect()
            .translater()
            .to_type_request(&self.sql_type)
    }

    /// Portable kind values of this column map to on the host side.
    pub fn host_kind(&self) -> Result<TypeKind> {
        Ok(self.type_request()?.kind)
    }

    /// Declared string width; [`NOT_A_STRING`] for non-strings.
    pub fn length_if_string(&self) -> i64 {
        self.table
            .dialect()
            .translater()
            .get_length_if_string(&self.sql_type)
    }

    pub fn decimal_size(&self) -> Option<DecimalSize> {
        self.table
            .dialect()
            .translater()
            .get_decimal_size(&self.sql_type)
    }

    /// Widen a string column to `new_width` characters.
    ///
    /// Same width is a no-op; a smaller width is a [`DialectError::Resize`].
    pub fn resize(
        &mut self,
        new_width: u32,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let current = self.length_if_string();
        if current == NOT_A_STRING {
            return Err(DialectError::Resize(format!(
                "Column {} is of type {}, which is not a string",
                self.column, self.sql_type
            )));
        }
        let requested = i64::from(new_width);
        if requested == current {
            return Ok(());
        }
        if requested < current {
            return Err(DialectError::Resize(format!(
                "Cannot resize column {} from {} to {} because the new size is smaller",
                self.column, current, requested
            )));
        }

        let translater = self.table.dialect().translater();
        let unicode = translater.is_unicode(&self.sql_type);
        let new_type =
            translater.to_proprietary_type(&TypeRequest::string(new_width).with_unicode(unicode));
        self.alter_type_to(&new_type, transaction)
    }

    /// Widen a fixed-point column to `before` integer digits and `after`
    /// fractional digits. Neither part may shrink.
    pub fn resize_decimal(
        &mut self,
        before: u32,
        after: u32,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let current = self.decimal_size().ok_or_else(|| {
            DialectError::Resize(format!(
                "Column {} is of type {}, which is not a decimal",
                self.column, self.sql_type
            ))
        })?;
        let current_before = current.before_decimal().unwrap_or(0);
        let current_after = current.after_decimal().unwrap_or(0);
        if before < current_before || after < current_after {
            return Err(DialectError::Resize(format!(
                "Cannot resize column {} from decimal({},{}) to decimal({},{}) because it would lose digits",
                self.column,
                current_before + current_after,
                current_after,
                before + after,
                after
            )));
        }
        if before == current_before && after == current_after {
            return Ok(());
        }

        let size = DecimalSize::new(i64::from(before), i64::from(after));
        let new_type = self
            .table
            .dialect()
            .translater()
            .to_proprietary_type(&TypeRequest::decimal(size));
        self.alter_type_to(&new_type, transaction)
    }

    /// Change the column to `new_type`, running every statement the dialect
    /// needs in order. The cached type only changes if all of them succeed.
    pub fn alter_type_to(
        &mut self,
        new_type: &str,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let dialect = self.table.dialect();
        let fqn = self.table.fully_qualified_name()?;
        let column = dialect.syntax().wrap(&self.column)?;
        let statements = dialect.helper().alter_column_type_sql(
            &fqn,
            &column,
            &self.sql_type,
            new_type,
            self.allow_nulls,
        )?;

        with_connection(
            self.table.server().data_adapter(),
            Some(self.table.database().name()),
            transaction,
            |conn| {
                for sql in &statements {
                    if let Err(e) = conn.execute(&Command::new(sql.as_str())) {
                        error!("ALTER of {}.{} failed: {}", fqn, column, e);
                        return Err(DialectError::alter_failed(sql.as_str(), e));
                    }
                }
                Ok(())
            },
        )?;

        info!(
            "Altered {}.{} from {} to {}",
            fqn, column, self.sql_type, new_type
        );
        self.sql_type = new_type.to_string();
        Ok(())
    }
}
