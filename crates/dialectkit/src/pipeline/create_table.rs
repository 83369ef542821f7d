//! CREATE TABLE from explicit column requests and/or sampled data.
//!
//! Column resolution order, per dataset column:
//!
//! 1. An explicit [`ColumnRequest`] with the same name (ignoring case) wins.
//!    A request carrying a proprietary type string is reverse-translated so
//!    every resolved column has a [`TypeRequest`].
//! 2. Text columns are guessed from their values by the [`TypeGuesser`].
//! 3. Typed columns keep their kind; values only refine width and size.
//! 4. Text columns flagged `do_not_retype` stay strings.
//!
//! Explicit requests that match no dataset column are appended after the
//! dataset columns. The caller's adjuster then gets the final say before
//! names are validated and SQL is generated.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::CreateTableConfig;
use crate::core::dataset::{DataColumn, DataSet, ValueKind};
use crate::core::identifier::{foreign_key_constraint_name, primary_key_constraint_name};
use crate::core::traits::{GuessSettings, TypeGuesser, DEFAULT_TIMEOUT_SECS};
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::core::value::SqlValue;
use crate::dialect::{foreign_key_constraint_sql, Dialect};
use crate::error::{DialectError, Result};
use crate::guess::{BasicGuesser, Culture};
use crate::schema::{ColumnRequest, DiscoveredColumn, DiscoveredDatabase, DiscoveredTable, TableType};

use super::batch::{execute_batches, BatchTiming, DEFAULT_BATCH_SEPARATOR};

/// Last-chance edit of the resolved columns before SQL is generated.
pub type ColumnAdjuster<'a> = &'a dyn Fn(&mut Vec<ColumnRequest>);

/// Everything [`create_table`] needs.
pub struct CreateTableArgs<'a> {
    pub table_name: String,
    pub schema: Option<String>,
    pub explicit_columns: Vec<ColumnRequest>,
    pub data: Option<&'a DataSet>,
    /// `(new column name, referenced primary column)` pairs.
    pub foreign_keys: Vec<(String, DiscoveredColumn)>,
    pub cascade_delete: bool,
    pub adjuster: Option<ColumnAdjuster<'a>>,
    /// Guesser for text columns; [`BasicGuesser`] when `None`.
    pub guesser: Option<&'a dyn TypeGuesser>,
    /// Create the table but do not upload `data`.
    pub create_empty: bool,
    pub culture: Culture,
    pub batch_separator: String,
    pub timeout_secs: u32,
    /// Rows sampled per column when guessing; all rows when `None`.
    pub sample_rows: Option<usize>,
}

impl<'a> CreateTableArgs<'a> {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema: None,
            explicit_columns: Vec::new(),
            data: None,
            foreign_keys: Vec::new(),
            cascade_delete: false,
            adjuster: None,
            guesser: None,
            create_empty: false,
            culture: Culture::default(),
            batch_separator: DEFAULT_BATCH_SEPARATOR.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sample_rows: None,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnRequest>) -> Self {
        self.explicit_columns = columns;
        self
    }

    pub fn with_data(mut self, data: &'a DataSet) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_foreign_keys(
        mut self,
        pairs: Vec<(String, DiscoveredColumn)>,
        cascade_delete: bool,
    ) -> Self {
        self.foreign_keys = pairs;
        self.cascade_delete = cascade_delete;
        self
    }

    pub fn with_adjuster(mut self, adjuster: ColumnAdjuster<'a>) -> Self {
        self.adjuster = Some(adjuster);
        self
    }

    pub fn with_guesser(mut self, guesser: &'a dyn TypeGuesser) -> Self {
        self.guesser = Some(guesser);
        self
    }

    pub fn with_culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    pub fn create_empty(mut self) -> Self {
        self.create_empty = true;
        self
    }

    /// Take separator, timeout and sample size from configuration.
    pub fn apply_config(mut self, config: &CreateTableConfig) -> Self {
        self.batch_separator = config.batch_separator.clone();
        self.timeout_secs = config.timeout_secs;
        self.sample_rows = config.sample_rows;
        self
    }
}

/// Resolved columns and generated SQL, before anything is executed.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTablePlan {
    pub columns: Vec<ColumnRequest>,
    /// Resolved type of every dataset column, keyed by its original name.
    pub inferred_types: BTreeMap<String, TypeRequest>,
    pub sql: String,
}

/// What [`create_table`] did.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTableReport {
    pub table: String,
    pub sql: String,
    pub inferred_types: BTreeMap<String, TypeRequest>,
    pub batches: Vec<BatchTiming>,
    pub rows_uploaded: u64,
}

impl CreateTableReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Resolve columns and build the CREATE TABLE statement without executing it.
pub fn plan_create_table(
    database: &DiscoveredDatabase,
    args: &CreateTableArgs<'_>,
) -> Result<CreateTablePlan> {
    let dialect = database.dialect();

    if let Some(data) = args.data {
        let opaque: Vec<String> = data
            .columns()
            .iter()
            .filter(|c| c.kind == ValueKind::Opaque)
            .map(|c| c.name.clone())
            .collect();
        if !opaque.is_empty() {
            return Err(DialectError::UnsupportedValue { columns: opaque });
        }
    }

    let (mut columns, inferred_types) = resolve_columns(dialect, args)?;
    if let Some(adjust) = args.adjuster {
        adjust(&mut columns);
    }

    let syntax = dialect.syntax();
    syntax.validate_table_name(&args.table_name)?;
    if columns.is_empty() {
        return Err(DialectError::InvalidArgument(format!(
            "No columns to create for table {}",
            args.table_name
        )));
    }
    for column in &columns {
        syntax.validate_column_name(&column.name)?;
    }

    let fqn = syntax.fully_qualify(database.name(), args.schema.as_deref(), &args.table_name)?;
    let sql = create_table_sql(dialect, &fqn, &args.table_name, &columns, args)?;
    Ok(CreateTablePlan {
        columns,
        inferred_types,
        sql,
    })
}

/// Plan, execute and (unless `create_empty`) load the table.
pub(crate) fn create_table(
    database: &DiscoveredDatabase,
    args: CreateTableArgs<'_>,
) -> Result<(DiscoveredTable, CreateTableReport)> {
    let plan = plan_create_table(database, &args)?;
    let table = database.expect_table(
        args.table_name.as_str(),
        args.schema.as_deref(),
        TableType::Table,
    );

    let batches = {
        let mut conn = database
            .server()
            .data_adapter()
            .open_connection(Some(database.name()))?;
        execute_batches(
            conn.as_mut(),
            &plan.sql,
            &args.batch_separator,
            args.timeout_secs,
        )?
    };
    info!(
        "Created table {} with {} columns",
        table.name(),
        plan.columns.len()
    );

    let mut report = CreateTableReport {
        table: table.name().to_string(),
        sql: plan.sql,
        inferred_types: plan.inferred_types,
        batches,
        rows_uploaded: 0,
    };

    if let Some(data) = args.data.filter(|d| !args.create_empty && !d.is_empty()) {
        let uploaded = table
            .begin_bulk_insert(args.culture, None)
            .and_then(|mut session| {
                session.set_timeout_secs(args.timeout_secs);
                session.upload(data)
            });
        match uploaded {
            Ok(rows) => report.rows_uploaded = rows,
            Err(source) => {
                error!("Table {} was created but loading it failed: {}", table.name(), source);
                return Err(DialectError::UploadAfterCreateFailed {
                    report: Box::new(report),
                    source: Box::new(source),
                });
            }
        }
    }
    Ok((table, report))
}

fn resolve_columns(
    dialect: &Dialect,
    args: &CreateTableArgs<'_>,
) -> Result<(Vec<ColumnRequest>, BTreeMap<String, TypeRequest>)> {
    let translater = dialect.translater();
    let mut columns = Vec::new();
    let mut inferred = BTreeMap::new();
    let mut used = vec![false; args.explicit_columns.len()];

    if let Some(data) = args.data {
        let basic = BasicGuesser::new();
        let guesser = args.guesser.unwrap_or(&basic);
        let settings = GuessSettings {
            extra_length_per_non_ascii: translater.extra_length_per_non_ascii_character(),
            culture: args.culture,
        };
        let sample = args.sample_rows.unwrap_or(usize::MAX);

        for (index, column) in data.columns().iter().enumerate() {
            let explicit = args
                .explicit_columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(&column.name));

            let request = match explicit {
                Some(position) => {
                    used[position] = true;
                    let mut request = args.explicit_columns[position].clone();
                    request.type_request = Some(request.resolve_type_request(translater)?);
                    request
                }
                None => {
                    let values = &mut data.column_values(index).take(sample);
                    let type_request = column_type(column, values, guesser, &settings);
                    let mut request = ColumnRequest::new(column.name.as_str(), type_request);
                    request.allow_nulls = column.allow_nulls;
                    request.is_primary_key = data.is_primary_key(&column.name);
                    request
                }
            };
            if let Some(type_request) = &request.type_request {
                inferred.insert(column.name.clone(), type_request.clone());
            }
            columns.push(request);
        }
    }

    for (request, _) in args
        .explicit_columns
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
    {
        if args.data.is_some() {
            warn!(
                "Column request '{}' matches no column of the data; adding it anyway",
                request.name
            );
        }
        columns.push(request.clone());
    }
    Ok((columns, inferred))
}

fn column_type<'v>(
    column: &DataColumn,
    values: &mut dyn Iterator<Item = &'v SqlValue>,
    guesser: &dyn TypeGuesser,
    settings: &GuessSettings,
) -> TypeRequest {
    match column.kind {
        ValueKind::Text if column.do_not_retype => string_type(values, guesser, settings),
        ValueKind::Text => guesser
            .guess_column(values, settings)
            .unwrap_or_else(|| TypeRequest::string(1)),
        ValueKind::Typed(kind) => typed_column_type(kind, values, guesser, settings),
        ValueKind::Opaque => TypeRequest::new(TypeKind::ByteArray),
    }
}

/// The declared kind of a typed column, sized from its values.
///
/// Strings and byte arrays get the widest value's length. A numeric kind too
/// narrow for the values widens along the numeric chain; other kinds are kept.
fn typed_column_type<'v>(
    kind: TypeKind,
    values: &mut dyn Iterator<Item = &'v SqlValue>,
    guesser: &dyn TypeGuesser,
    settings: &GuessSettings,
) -> TypeRequest {
    match kind {
        TypeKind::String => string_type(values, guesser, settings),
        TypeKind::ByteArray => {
            let width = values
                .filter_map(|v| match v {
                    SqlValue::Bytes(b) => Some(b.len()),
                    SqlValue::Text(t) => Some(t.len()),
                    _ => None,
                })
                .max()
                .unwrap_or(1)
                .max(1);
            TypeRequest::byte_array(Some(width as u32))
        }
        _ if kind.is_numeric() => {
            let values: Vec<&SqlValue> = values.filter(|v| !v.is_null()).collect();
            let fits = kind.integer_range().is_some_and(|(min, max)| {
                values
                    .iter()
                    .all(|v| v.as_i64().is_some_and(|n| (min..=max).contains(&n)))
            });
            if fits {
                return TypeRequest::new(kind);
            }
            let observed = values
                .iter()
                .fold(None, |acc, v| guesser.widen(acc, v, settings));
            match observed {
                Some(o) if o.kind.is_numeric() => {
                    guesser.finish(TypeRequest::widen(&TypeRequest::new(kind), &o))
                }
                _ => TypeRequest::new(kind),
            }
        }
        _ => TypeRequest::new(kind),
    }
}

/// A string wide enough for every value, plus the dialect's non-ASCII allowance.
fn string_type<'v>(
    values: &mut dyn Iterator<Item = &'v SqlValue>,
    guesser: &dyn TypeGuesser,
    settings: &GuessSettings,
) -> TypeRequest {
    let (mut width, mut unicode) = (1u32, false);
    for value in values {
        let needed = match value.as_text() {
            Some(text) => {
                let non_ascii = text.chars().filter(|c| !c.is_ascii()).count() as u32;
                unicode |= non_ascii > 0;
                text.chars().count() as u32 + non_ascii * settings.extra_length_per_non_ascii
            }
            None => guesser
                .guess_value(value, settings)
                .and_then(|r| r.text_width())
                .unwrap_or(0),
        };
        width = width.max(needed);
    }
    TypeRequest::string(width).with_unicode(unicode)
}

fn create_table_sql(
    dialect: &Dialect,
    fqn: &str,
    table_name: &str,
    columns: &[ColumnRequest],
    args: &CreateTableArgs<'_>,
) -> Result<String> {
    let syntax = dialect.syntax();
    let helper = dialect.helper();

    let mut lines = columns
        .iter()
        .map(|c| column_line(dialect, c))
        .collect::<Result<Vec<_>>>()?;

    let inline_primary_key =
        helper.auto_increment_is_inline_primary_key() && columns.iter().any(|c| c.is_auto_increment);
    let primary_key: Vec<&ColumnRequest> = columns.iter().filter(|c| c.is_primary_key).collect();
    if !primary_key.is_empty() && !inline_primary_key {
        let wrapped = primary_key
            .iter()
            .map(|c| syntax.wrap(&c.name))
            .collect::<Result<Vec<_>>>()?;
        lines.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            primary_key_constraint_name(table_name),
            wrapped.join(",")
        ));
    }

    if let Some((_, first)) = args.foreign_keys.first() {
        let primary_table = first.table();
        if args.foreign_keys.iter().any(|(_, p)| p.table() != primary_table) {
            return Err(DialectError::InvalidArgument(format!(
                "Foreign keys of {} reference more than one primary table",
                table_name
            )));
        }
        let mut foreign_columns = Vec::with_capacity(args.foreign_keys.len());
        let mut primary_columns = Vec::with_capacity(args.foreign_keys.len());
        for (foreign, primary) in &args.foreign_keys {
            let Some(column) = columns.iter().find(|c| c.name.eq_ignore_ascii_case(foreign)) else {
                return Err(DialectError::InvalidArgument(format!(
                    "Foreign key column '{}' is not a column of {}",
                    foreign, table_name
                )));
            };
            foreign_columns.push(syntax.wrap(&column.name)?);
            primary_columns.push(primary.wrapped_name()?);
        }
        lines.push(foreign_key_constraint_sql(
            &foreign_key_constraint_name(table_name, primary_table.name()),
            &foreign_columns,
            &primary_table.fully_qualified_name()?,
            &primary_columns,
            args.cascade_delete,
        ));
    }

    Ok(format!("CREATE TABLE {}(\n{}\n)", fqn, lines.join(",\n")))
}

/// `<name> <type> [default <fn>] [COLLATE <c>] NULL|NOT NULL [<auto-increment>]`
fn column_line(dialect: &Dialect, column: &ColumnRequest) -> Result<String> {
    let syntax = dialect.syntax();
    let mut sql_type = column.proprietary_type(dialect.translater())?;
    if column.is_auto_increment {
        sql_type = dialect.helper().auto_increment_column_type(&sql_type);
    }

    let mut line = format!("{} {}", syntax.wrap(&column.name)?, sql_type);
    if let Some(function) = column.default.scalar_function() {
        line.push_str(" default ");
        line.push_str(&syntax.scalar_function_sql(function));
    }
    if let Some(collation) = &column.collation {
        line.push_str(" COLLATE ");
        line.push_str(collation);
    }
    line.push_str(if column.effective_allow_nulls() {
        " NULL"
    } else {
        " NOT NULL"
    });
    if column.is_auto_increment {
        line.push(' ');
        line.push_str(syntax.auto_increment_keyword());
    }
    Ok(line)
}
