//! Table creation pipeline.
//!
//! Creating a table from data runs in fixed steps:
//!
//! 1. Reject datasets holding opaque host values
//! 2. Resolve a [`ColumnRequest`](crate::schema::ColumnRequest) per column
//!    (explicit request, guessed type or declared type)
//! 3. Let the caller adjust the column list
//! 4. Validate names and generate the CREATE TABLE script
//! 5. Execute the script batch by batch
//! 6. Bulk load the data through a [`BulkLoadSession`](crate::transfer::BulkLoadSession)
//!
//! Steps 1 to 4 are available on their own through [`plan_create_table`].
//!
//! # Design Patterns
//!
//! - **Template Method**: the step order is fixed; dialect strategies and the
//!   [`TypeGuesser`](crate::core::TypeGuesser) fill in each step
//! - **Builder**: [`CreateTableArgs`] collects optional inputs fluently

mod batch;
mod create_table;

pub use batch::{execute_batches, split_batches, Batch, BatchTiming, DEFAULT_BATCH_SEPARATOR};
pub use create_table::{
    plan_create_table, ColumnAdjuster, CreateTableArgs, CreateTablePlan, CreateTableReport,
};

pub(crate) use create_table::create_table;
