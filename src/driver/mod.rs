//! Driver abstraction layer.
//!
//! A [`Driver`] supplies the database-specific URI format, URI validation,
//! and the ability to open a connection. A [`DriverConnection`] is the
//! contract the facade expects from an open connection: statement execution,
//! auto-commit toggling, commit/rollback, and close.
//!
//! The shipped drivers ([`MySqlDriver`], [`PostgresDriver`],
//! [`SqliteDriver`]) each wrap a single sqlx connection. Custom drivers only
//! need to implement the two traits.

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::DbResult;
use crate::models::{DatabaseInfo, QueryParam};

pub use mysql::MySqlDriver;
pub use postgres::PostgresDriver;
pub use sqlite::SqliteDriver;

/// Database driver descriptor: URI generation, validation, and loading.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Short identifier for this driver, e.g. "mysql".
    fn name(&self) -> &'static str;

    /// Generate a connection URI from a database descriptor.
    ///
    /// The result is not guaranteed to be valid; callers gate on
    /// [`Driver::is_valid_uri`] before opening.
    fn format_uri(&self, info: &DatabaseInfo) -> String;

    /// Check whether a connection URI is acceptable to this driver.
    fn is_valid_uri(&self, uri: &str) -> bool;

    /// Open a connection to the database behind the URI.
    async fn open(&self, uri: &str) -> DbResult<Box<dyn DriverConnection>>;
}

/// An open driver-level connection.
///
/// Statement methods return the number of affected rows. Auto-commit starts
/// enabled; disabling it opens a transaction, and `commit`/`rollback` end
/// the open transaction without touching the auto-commit flag.
#[async_trait]
pub trait DriverConnection: Send {
    /// Execute a raw SQL statement.
    async fn execute(&mut self, sql: &str) -> DbResult<u64>;

    /// Execute a prepared statement with bound parameters.
    async fn prepare_execute(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<u64>;

    /// Invoke a stored procedure (`CALL ...`).
    async fn call(&mut self, sql: &str) -> DbResult<u64>;

    /// Toggle auto-commit mode.
    async fn set_auto_commit(&mut self, enabled: bool) -> DbResult<()>;

    /// Current auto-commit flag.
    fn auto_commit(&self) -> bool;

    /// Commit the open transaction.
    async fn commit(&mut self) -> DbResult<()>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> DbResult<()>;

    /// Best-effort server version string.
    async fn server_version(&mut self) -> Option<String>;

    /// Close the connection. Idempotent.
    async fn close(&mut self) -> DbResult<()>;

    /// Check whether the connection has been closed.
    fn is_closed(&self) -> bool;
}
