//! Transaction management over a borrowed driver connection.

use tracing::debug;

use crate::driver::DriverConnection;
use crate::error::DbResult;
use crate::models::QueryParam;

/// Transaction handle bound to a live connection.
///
/// Borrows the driver connection mutably, so it cannot outlive the
/// connection or coexist with `close()`. While the manager exists,
/// statements inside the transaction go through it.
pub struct TransactionManager<'a> {
    conn: &'a mut dyn DriverConnection,
}

impl<'a> std::fmt::Debug for TransactionManager<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager").finish_non_exhaustive()
    }
}

impl<'a> TransactionManager<'a> {
    pub(crate) fn new(conn: &'a mut dyn DriverConnection) -> Self {
        Self { conn }
    }

    /// Start a transaction by disabling auto-commit.
    pub async fn begin(&mut self) -> DbResult<()> {
        debug!("Beginning transaction");
        self.conn.set_auto_commit(false).await
    }

    /// Commit the transaction and re-enable auto-commit.
    pub async fn commit(&mut self) -> DbResult<()> {
        self.conn.commit().await?;
        self.conn.set_auto_commit(true).await?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Roll back the transaction.
    ///
    /// Auto-commit stays disabled afterwards, unlike `commit()`; callers
    /// that want it back must re-enable it explicitly.
    pub async fn rollback(&mut self) -> DbResult<()> {
        self.conn.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }

    /// Current auto-commit flag of the bound connection.
    pub fn auto_commit(&self) -> bool {
        self.conn.auto_commit()
    }

    /// Execute a raw SQL statement inside the transaction.
    pub async fn execute(&mut self, sql: &str) -> DbResult<u64> {
        self.conn.execute(sql).await
    }

    /// Execute a prepared statement inside the transaction.
    pub async fn prepare_execute(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        self.conn.prepare_execute(sql, params).await
    }
}
