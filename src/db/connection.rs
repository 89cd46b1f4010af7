//! Single-connection facade with reconnect-on-failure.
//!
//! A [`Connection`] owns at most one driver-level connection. Statement
//! operations require the connected state; on a driver execution error the
//! reconnect policy may transparently close, reopen, and retry before the
//! error reaches the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ConnectOptions;
use crate::db::transaction::TransactionManager;
use crate::driver::{Driver, DriverConnection};
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseInfo, QueryParam, mask_credentials};

/// Connection lifecycle state. "Not connected" is a typed state, not a null.
enum ConnectionState {
    Disconnected,
    Connected(Box<dyn DriverConnection>),
}

/// Observable state of the reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// No reconnect in progress; last operation (if any) succeeded.
    Idle,
    /// A reconnect cycle is underway.
    Reconnecting,
    /// All reconnect cycles failed; the last error was surfaced.
    Exhausted,
}

/// A statement operation, carried through the retry loop so the same
/// operation can be re-dispatched after a reconnect.
enum Statement<'a> {
    Execute(&'a str),
    PrepareExecute(&'a str, &'a [QueryParam]),
    Call(&'a str),
}

impl Statement<'_> {
    fn operation(&self) -> &'static str {
        match self {
            Self::Execute(_) => "execute",
            Self::PrepareExecute(_, _) => "prepare_execute",
            Self::Call(_) => "call",
        }
    }
}

async fn dispatch(conn: &mut dyn DriverConnection, stmt: &Statement<'_>) -> DbResult<u64> {
    match stmt {
        Statement::Execute(sql) => conn.execute(sql).await,
        Statement::PrepareExecute(sql, params) => conn.prepare_execute(sql, params).await,
        Statement::Call(sql) => conn.call(sql).await,
    }
}

/// A single database connection handle.
///
/// Exclusive owner of the underlying driver connection. All operations take
/// `&mut self`; shared use requires external synchronization, which the
/// borrow checker enforces.
pub struct Connection {
    driver: Arc<dyn Driver>,
    info: DatabaseInfo,
    options: ConnectOptions,
    state: ConnectionState,
    retry_state: RetryState,
}

impl Connection {
    pub(crate) fn new(driver: Arc<dyn Driver>, info: DatabaseInfo, options: ConnectOptions) -> Self {
        Self {
            driver,
            info,
            options,
            state: ConnectionState::Disconnected,
            retry_state: RetryState::Idle,
        }
    }

    /// Open the connection.
    ///
    /// The URI generated by the driver is validated first; an invalid URI
    /// fails fast with a configuration error before any open attempt.
    /// Replaces any previously held connection.
    pub async fn connect(&mut self) -> DbResult<()> {
        let conn = self.open_driver_connection().await?;
        self.state = ConnectionState::Connected(conn);
        self.retry_state = RetryState::Idle;
        info!(
            driver = self.driver.name(),
            host = %self.info.host,
            database = %self.info.database,
            "Connected"
        );
        Ok(())
    }

    async fn open_driver_connection(&self) -> DbResult<Box<dyn DriverConnection>> {
        let uri = self.driver.format_uri(&self.info);
        if !self.driver.is_valid_uri(&uri) {
            return Err(DbError::invalid_uri(
                mask_credentials(&uri),
                self.driver.name(),
            ));
        }
        debug!(
            driver = self.driver.name(),
            uri = %mask_credentials(&uri),
            "Opening connection"
        );
        self.driver.open(&uri).await
    }

    /// Execute a raw SQL statement, returning the number of affected rows.
    pub async fn execute(&mut self, sql: &str) -> DbResult<u64> {
        self.run(Statement::Execute(sql)).await
    }

    /// Execute a prepared statement with bound parameters.
    pub async fn prepare_execute(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        self.run(Statement::PrepareExecute(sql, params)).await
    }

    /// Invoke a stored procedure (`CALL ...`).
    pub async fn call(&mut self, sql: &str) -> DbResult<u64> {
        self.run(Statement::Call(sql)).await
    }

    async fn run(&mut self, stmt: Statement<'_>) -> DbResult<u64> {
        let conn = match &mut self.state {
            ConnectionState::Connected(conn) => conn,
            ConnectionState::Disconnected => {
                return Err(DbError::not_connected(stmt.operation()));
            }
        };
        match dispatch(conn.as_mut(), &stmt).await {
            Ok(rows) => {
                self.retry_state = RetryState::Idle;
                Ok(rows)
            }
            Err(err) if err.is_retryable() => self.reconnect_and_retry(stmt, err).await,
            Err(err) => Err(err),
        }
    }

    /// The reconnect policy: up to `retry_times` cycles of close → reopen →
    /// retry the failed statement once. The last error wins when all cycles
    /// fail. Configuration errors never reach this point.
    async fn reconnect_and_retry(
        &mut self,
        stmt: Statement<'_>,
        original: DbError,
    ) -> DbResult<u64> {
        if !self.options.auto_reconnect_or_default() {
            return Err(original);
        }

        let retry_times = self.options.retry_times_or_default();
        self.retry_state = RetryState::Reconnecting;
        let mut last_error = original;

        for attempt in 1..=retry_times {
            warn!(
                attempt,
                retry_times,
                error = %last_error,
                "Reconnecting after execution failure"
            );
            if let Err(close_error) = self.close().await {
                debug!(error = %close_error, "Discarding failed connection");
            }
            match self.open_driver_connection().await {
                Ok(mut conn) => match dispatch(conn.as_mut(), &stmt).await {
                    Ok(rows) => {
                        self.state = ConnectionState::Connected(conn);
                        self.retry_state = RetryState::Idle;
                        return Ok(rows);
                    }
                    Err(err) => {
                        self.state = ConnectionState::Connected(conn);
                        last_error = err;
                    }
                },
                Err(err) => {
                    last_error = err;
                }
            }
        }

        self.retry_state = RetryState::Exhausted;
        Err(last_error)
    }

    /// Close the connection.
    ///
    /// The held connection is cleared before the driver close is awaited, so
    /// the handle is disconnected on every exit path; a driver close error
    /// still surfaces to the caller. Idempotent.
    pub async fn close(&mut self) -> DbResult<()> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Disconnected => Ok(()),
            ConnectionState::Connected(mut conn) => {
                let result = conn.close().await;
                info!(driver = self.driver.name(), "Connection closed");
                result
            }
        }
    }

    /// Get a transaction manager bound to the live connection.
    ///
    /// The manager mutably borrows this handle; statements inside the
    /// transaction go through the manager.
    pub fn transaction_manager(&mut self) -> DbResult<TransactionManager<'_>> {
        match &mut self.state {
            ConnectionState::Connected(conn) if !conn.is_closed() => {
                Ok(TransactionManager::new(conn.as_mut()))
            }
            _ => Err(DbError::configuration(
                "transaction manager requires an open connection",
                "Call connect() before starting a transaction",
            )),
        }
    }

    /// Best-effort server version string.
    pub async fn server_version(&mut self) -> DbResult<Option<String>> {
        match &mut self.state {
            ConnectionState::Connected(conn) => Ok(conn.server_version().await),
            ConnectionState::Disconnected => Err(DbError::not_connected("server_version")),
        }
    }

    /// Check whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Current state of the reconnect policy.
    pub fn retry_state(&self) -> RetryState {
        self.retry_state
    }

    /// The options this handle was built with.
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// The database descriptor this handle was built with.
    pub fn database_info(&self) -> &DatabaseInfo {
        &self.info
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.driver.name())
            .field("host", &self.info.host)
            .field("database", &self.info.database)
            .field("connected", &self.is_connected())
            .field("retry_state", &self.retry_state)
            .finish()
    }
}
