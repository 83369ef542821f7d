//! Table handle and the table-level operations.

use tracing::{info, warn};

use crate::core::identifier::{foreign_key_constraint_name, primary_key_constraint_name};
use crate::core::traits::{Command, DbConnection, TableRef};
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::core::value::SqlValue;
use crate::dialect::{parameter_names_for, Dialect};
use crate::error::{DialectError, Result};
use crate::guess::{Culture, DateTimeDecider};
use crate::transfer::BulkLoadSession;

use super::column::DiscoveredColumn;
use super::database::DiscoveredDatabase;
use super::relationship::{CascadeRule, Relationship};
use super::server::DiscoveredServer;
use super::transaction::{with_connection, with_transaction, ManagedTransaction};
use super::TableType;

/// Suffix of the scratch table used by [`DiscoveredTable::make_distinct`].
const DISTINCT_TEMP_SUFFIX: &str = "_DistinctingTemp";

/// A table, view or table-valued function. May not exist yet.
#[derive(Debug, Clone)]
pub struct DiscoveredTable {
    database: DiscoveredDatabase,
    name: String,
    schema: Option<String>,
    table_type: TableType,
}

impl DiscoveredTable {
    pub(crate) fn new(
        database: DiscoveredDatabase,
        name: String,
        schema: Option<String>,
        table_type: TableType,
    ) -> Self {
        Self {
            database,
            name,
            schema,
            table_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn database(&self) -> &DiscoveredDatabase {
        &self.database
    }

    pub fn server(&self) -> &DiscoveredServer {
        self.database.server()
    }

    pub fn dialect(&self) -> &Dialect {
        self.database.dialect()
    }

    pub fn fully_qualified_name(&self) -> Result<String> {
        self.dialect()
            .syntax()
            .fully_qualify(self.database.name(), self.schema(), &self.name)
    }

    pub(crate) fn table_ref(&self) -> TableRef<'_> {
        TableRef {
            database: self.database.name(),
            schema: self.schema(),
            table: &self.name,
            table_type: self.table_type,
        }
    }

    fn with_connection<T>(
        &self,
        transaction: Option<&mut ManagedTransaction>,
        f: impl FnOnce(&mut dyn DbConnection) -> Result<T>,
    ) -> Result<T> {
        with_connection(
            self.server().data_adapter(),
            Some(self.database.name()),
            transaction,
            f,
        )
    }

    fn execute(&self, sql: &str, transaction: Option<&mut ManagedTransaction>) -> Result<u64> {
        self.with_connection(transaction, |conn| conn.execute(&Command::new(sql)))
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    pub fn exists(&self, transaction: Option<&mut ManagedTransaction>) -> Result<bool> {
        self.with_connection(transaction, |conn| {
            self.server()
                .schema_adapter()
                .table_exists(conn, &self.table_ref())
        })
    }

    pub fn discover_columns(
        &self,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<Vec<DiscoveredColumn>> {
        self.with_connection(transaction, |conn| self.discover_columns_on(conn))
    }

    pub(crate) fn discover_columns_on(
        &self,
        conn: &mut dyn DbConnection,
    ) -> Result<Vec<DiscoveredColumn>> {
        Ok(self
            .server()
            .schema_adapter()
            .describe_columns(conn, &self.table_ref())?
            .into_iter()
            .map(|info| DiscoveredColumn::from_info(self, info))
            .collect())
    }

    /// The column called `name` (case-insensitive).
    pub fn discover_column(
        &self,
        name: &str,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<DiscoveredColumn> {
        self.discover_columns(transaction)?
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                DialectError::InvalidArgument(format!(
                    "Could not find column '{}' in table {}",
                    name, self.name
                ))
            })
    }

    /// Foreign keys in which this table is the primary (referenced) side.
    pub fn discover_relationships(
        &self,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<Vec<Relationship>> {
        self.with_connection(transaction, |conn| {
            self.server()
                .schema_adapter()
                .list_relationships(conn, &self.table_ref())
        })
    }

    pub fn row_count(&self, transaction: Option<&mut ManagedTransaction>) -> Result<u64> {
        let sql = self
            .dialect()
            .helper()
            .row_count_sql(&self.fully_qualified_name()?);
        let count = self.with_connection(transaction, |conn| conn.scalar(&Command::new(sql)))?;
        Ok(count.as_i64().unwrap_or(0).max(0) as u64)
    }

    /// `SELECT *` limited to `n` rows, honouring the dialect's placement.
    pub fn top_n_sql(&self, n: u64) -> Result<String> {
        Ok(self
            .dialect()
            .syntax()
            .build_top_n_select(&self.fully_qualified_name()?, "*", n))
    }

    // =========================================================================
    // Schema changes
    // =========================================================================

    pub fn drop_table(&self, transaction: Option<&mut ManagedTransaction>) -> Result<()> {
        self.with_connection(transaction, |conn| {
            self.server()
                .schema_adapter()
                .drop_table(conn, &self.table_ref())
        })
    }

    pub fn add_column(
        &self,
        name: &str,
        request: &TypeRequest,
        allow_nulls: bool,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let sql_type = self.dialect().translater().to_proprietary_type(request);
        self.add_column_with_type(name, &sql_type, allow_nulls, transaction)
    }

    /// Add a column declared with a proprietary type string.
    pub fn add_column_with_type(
        &self,
        name: &str,
        sql_type: &str,
        allow_nulls: bool,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let syntax = self.dialect().syntax();
        syntax.validate_column_name(name)?;
        let sql = self.dialect().helper().add_column_sql(
            &self.fully_qualified_name()?,
            &syntax.wrap(name)?,
            sql_type,
            allow_nulls,
        );
        self.execute(&sql, transaction)?;
        info!("Added column {} {} to {}", name, sql_type, self.name);
        Ok(())
    }

    pub fn drop_column(
        &self,
        name: &str,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let sql = self.dialect().helper().drop_column_sql(
            &self.fully_qualified_name()?,
            &self.dialect().syntax().wrap(name)?,
        );
        self.execute(&sql, transaction)?;
        info!("Dropped column {} from {}", name, self.name);
        Ok(())
    }

    /// Rename the table. This handle follows the new name.
    pub fn rename(
        &mut self,
        new_name: &str,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        if self.table_type != TableType::Table {
            return Err(DialectError::not_supported(
                self.dialect().database_type().to_string(),
                format!("renaming a {}", self.table_type),
            ));
        }
        let syntax = self.dialect().syntax();
        syntax.validate_table_name(new_name)?;
        let new_fqn = syntax.fully_qualify(self.database.name(), self.schema(), new_name)?;
        let sql = self.dialect().helper().rename_table_sql(
            &self.fully_qualified_name()?,
            new_name,
            &syntax.wrap(new_name)?,
            &new_fqn,
        );
        self.execute(&sql, transaction)?;
        info!("Renamed table {} to {}", self.name, new_name);
        self.name = new_name.to_string();
        Ok(())
    }

    pub fn truncate(&self, transaction: Option<&mut ManagedTransaction>) -> Result<()> {
        let sql = self
            .dialect()
            .helper()
            .truncate_sql(&self.fully_qualified_name()?);
        self.execute(&sql, transaction)?;
        info!("Truncated {}", self.name);
        Ok(())
    }

    /// Remove duplicate rows in place, in a single transaction.
    ///
    /// The table keeps its name and identity; rows go through a scratch
    /// table named `{table}_DistinctingTemp`.
    pub fn make_distinct(
        &self,
        timeout_secs: u32,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        let syntax = self.dialect().syntax();
        let temp = format!("{}{}", self.name, DISTINCT_TEMP_SUFFIX);
        syntax.validate_table_name(&temp)?;
        let temp_fqn = syntax.fully_qualify(self.database.name(), self.schema(), &temp)?;
        let statements = self
            .dialect()
            .helper()
            .make_distinct_sql(&self.fully_qualified_name()?, &temp_fqn);

        with_transaction(
            self.server().data_adapter(),
            Some(self.database.name()),
            transaction,
            |conn| {
                let mut cmd = Command::new("").with_timeout(timeout_secs);
                for sql in &statements {
                    cmd.set_text(sql.as_str());
                    conn.execute(&cmd)?;
                }
                Ok(())
            },
        )?;
        info!("Removed duplicate rows from {}", self.name);
        Ok(())
    }

    pub fn create_primary_key(
        &self,
        columns: &[&str],
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<()> {
        if columns.is_empty() {
            return Err(DialectError::InvalidArgument(format!(
                "No columns given for the primary key of {}",
                self.name
            )));
        }
        let syntax = self.dialect().syntax();
        let wrapped = columns
            .iter()
            .map(|c| syntax.wrap(c))
            .collect::<Result<Vec<_>>>()?;
        let sql = self.dialect().helper().create_primary_key_sql(
            &self.fully_qualified_name()?,
            &primary_key_constraint_name(&self.name),
            &wrapped,
        )?;
        self.execute(&sql, transaction)?;
        info!("Created primary key ({}) on {}", columns.join(", "), self.name);
        Ok(())
    }

    /// Add a foreign key from this table to the table owning the primary
    /// columns. `pairs` is `(foreign column of this table, primary column)`.
    pub fn add_foreign_key(
        &self,
        pairs: &[(&DiscoveredColumn, &DiscoveredColumn)],
        cascade_delete: bool,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<Relationship> {
        let primary_table = single_primary_table(pairs)?;
        if let Some((foreign, _)) = pairs.iter().find(|(f, _)| f.table() != self) {
            return Err(DialectError::InvalidArgument(format!(
                "Column {} does not belong to table {}",
                foreign.name(),
                self.name
            )));
        }

        let constraint = foreign_key_constraint_name(&self.name, primary_table.name());
        let foreign_columns = pairs
            .iter()
            .map(|(f, _)| f.wrapped_name())
            .collect::<Result<Vec<_>>>()?;
        let primary_columns = pairs
            .iter()
            .map(|(_, p)| p.wrapped_name())
            .collect::<Result<Vec<_>>>()?;
        let sql = self.dialect().helper().add_foreign_key_sql(
            &self.fully_qualified_name()?,
            &constraint,
            &foreign_columns,
            &primary_table.fully_qualified_name()?,
            &primary_columns,
            cascade_delete,
        )?;
        self.execute(&sql, transaction)?;
        info!("Created foreign key {} on {}", constraint, self.name);

        let mut relationship = Relationship::new(
            constraint,
            primary_table.name(),
            self.name.as_str(),
            CascadeRule::from_cascade_delete(cascade_delete),
        );
        for (foreign, primary) in pairs {
            relationship.add_key(primary.name(), foreign.name());
        }
        Ok(relationship)
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Insert one row and return the auto-increment value it generated, or
    /// 0 if the table has no auto-increment column.
    ///
    /// Text bound for date or time columns is parsed with `culture`; text that
    /// does not parse is inserted as NULL.
    pub fn insert(
        &self,
        values: &[(&str, SqlValue)],
        culture: Culture,
        transaction: Option<&mut ManagedTransaction>,
    ) -> Result<i64> {
        let dialect = self.dialect();
        let fqn = self.fully_qualified_name()?;
        self.with_connection(transaction, |conn| {
            let columns = self.discover_columns_on(conn)?;
            let decider = DateTimeDecider::new(culture);

            let mut names = Vec::with_capacity(values.len());
            let mut wrapped = Vec::with_capacity(values.len());
            let mut bound = Vec::with_capacity(values.len());
            for (name, value) in values {
                let column = columns
                    .iter()
                    .find(|c| c.name().eq_ignore_ascii_case(name))
                    .ok_or_else(|| DialectError::column_mapping(*name, self.name.as_str()))?;
                names.push(column.name().to_string());
                wrapped.push(column.wrapped_name()?);
                bound.push(coerce_for_column(column, value, &decider));
            }

            let parameters = parameter_names_for(dialect.syntax(), &names);
            let sql = dialect.helper().insert_sql(&fqn, &wrapped, &parameters);
            let mut cmd = Command::new(sql);
            cmd.params = parameters.into_iter().zip(bound).collect();
            conn.execute(&cmd)?;

            let Some(identity) = columns.iter().find(|c| c.is_auto_increment) else {
                return Ok(0);
            };
            let Some(sql) = dialect
                .helper()
                .last_identity_sql(&fqn, Some(&identity.wrapped_name()?))
            else {
                return Ok(0);
            };
            Ok(conn.scalar(&Command::new(sql))?.as_i64().unwrap_or(0))
        })
    }

    /// Start a bulk-load session against this table.
    ///
    /// With a caller transaction the session loads inside it and never
    /// commits or closes it.
    pub fn begin_bulk_insert<'t>(
        &self,
        culture: Culture,
        transaction: Option<&'t mut ManagedTransaction>,
    ) -> Result<BulkLoadSession<'t>> {
        BulkLoadSession::new(self.clone(), culture, transaction)
    }
}

impl PartialEq for DiscoveredTable {
    fn eq(&self, other: &Self) -> bool {
        let default_schema = self.dialect().syntax().default_schema();
        let schema_eq = match (
            self.schema().or(default_schema),
            other.schema().or(default_schema),
        ) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        self.database.name().eq_ignore_ascii_case(other.database.name())
            && self.name.eq_ignore_ascii_case(&other.name)
            && schema_eq
    }
}

fn single_primary_table<'a>(
    pairs: &[(&DiscoveredColumn, &'a DiscoveredColumn)],
) -> Result<&'a DiscoveredTable> {
    let Some((_, first)) = pairs.first() else {
        return Err(DialectError::InvalidArgument(
            "A foreign key needs at least one column pair".to_string(),
        ));
    };
    let table = first.table();
    if pairs.iter().any(|(_, p)| p.table() != table) {
        return Err(DialectError::InvalidArgument(format!(
            "Foreign key columns reference more than one primary table: {}",
            pairs
                .iter()
                .map(|(_, p)| p.table().name())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    Ok(table)
}

/// Text headed for a date or time column is parsed; everything else is bound as is.
fn coerce_for_column(
    column: &DiscoveredColumn,
    value: &SqlValue,
    decider: &DateTimeDecider,
) -> SqlValue {
    let Some(text) = value.as_text() else {
        return value.clone();
    };
    let kind = match column.data_type().host_kind() {
        Ok(kind) if kind.is_date_like() => kind,
        _ => return value.clone(),
    };
    if text.trim().is_empty() {
        return SqlValue::Null;
    }
    let parsed = if kind == TypeKind::TimeSpan {
        decider.parse_time(text).map(SqlValue::Time)
    } else {
        decider.parse(text).map(SqlValue::DateTime)
    };
    parsed.unwrap_or_else(|| {
        warn!(
            "Could not parse '{}' for column {}, inserting NULL",
            text,
            column.name()
        );
        SqlValue::Null
    })
}
