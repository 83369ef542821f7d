//! Caller-owned transactions and the optional-transaction helpers.
//!
//! Operations that accept `Option<&mut ManagedTransaction>` run on the
//! caller's connection when one is given and never commit, roll back or close
//! it. Without one they open a private connection that is released when the
//! helper returns, on every exit path.

use tracing::{debug, warn};

use crate::core::traits::{DataAdapter, DbConnection};
use crate::error::Result;

/// A connection with an open transaction.
///
/// Dropping a transaction that was neither committed nor abandoned rolls it
/// back.
pub struct ManagedTransaction {
    connection: Box<dyn DbConnection>,
    open: bool,
}

impl ManagedTransaction {
    /// Start a transaction on `connection`, taking ownership of it.
    pub fn begin(mut connection: Box<dyn DbConnection>) -> Result<Self> {
        connection.begin()?;
        debug!("Transaction started");
        Ok(Self {
            connection,
            open: true,
        })
    }

    pub fn connection(&mut self) -> &mut dyn DbConnection {
        self.connection.as_mut()
    }

    pub fn commit_and_close(mut self) -> Result<()> {
        self.connection.commit()?;
        self.open = false;
        debug!("Transaction committed");
        Ok(())
    }

    pub fn abandon_and_close(mut self) -> Result<()> {
        self.open = false;
        self.connection.rollback()?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

impl Drop for ManagedTransaction {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.connection.rollback() {
                warn!("Failed to roll back abandoned transaction: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for ManagedTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedTransaction")
            .field("open", &self.open)
            .field("database", &self.connection.database())
            .finish()
    }
}

/// Run `f` on the caller's transaction, or on a connection opened for the call.
pub(crate) fn with_connection<T>(
    adapter: &dyn DataAdapter,
    database: Option<&str>,
    transaction: Option<&mut ManagedTransaction>,
    f: impl FnOnce(&mut dyn DbConnection) -> Result<T>,
) -> Result<T> {
    match transaction {
        Some(tx) => f(tx.connection()),
        None => {
            let mut conn = adapter.open_connection(database)?;
            f(conn.as_mut())
        }
    }
}

/// Like [`with_connection`], but a private connection gets its own
/// transaction, committed only if `f` succeeds.
pub(crate) fn with_transaction<T>(
    adapter: &dyn DataAdapter,
    database: Option<&str>,
    transaction: Option<&mut ManagedTransaction>,
    f: impl FnOnce(&mut dyn DbConnection) -> Result<T>,
) -> Result<T> {
    match transaction {
        Some(tx) => f(tx.connection()),
        None => {
            let mut own = ManagedTransaction::begin(adapter.open_connection(database)?)?;
            let value = f(own.connection())?;
            own.commit_and_close()?;
            Ok(value)
        }
    }
}
