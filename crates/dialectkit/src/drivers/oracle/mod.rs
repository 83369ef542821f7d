//! Oracle dialect.
//!
//! Oracle has no separate database/schema level: the "database" of the
//! portable model maps onto an Oracle user/schema. Integer-like kinds are all
//! spelled as `number(p)` and told apart by precision.

mod dialect;
mod table;
mod types;

pub use dialect::OracleSyntax;
pub use table::OracleTableHelper;
pub use types::OracleTypeTranslater;
