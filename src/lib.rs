//! db-bridge
//!
//! A reconnecting single-connection facade over SQL database drivers
//! (MySQL, PostgreSQL, SQLite). Build a handle from a database descriptor,
//! a driver, and an option bag; execute statements; manage transactions;
//! optionally let failed statements retry across transparent reconnects.

pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod models;

pub use config::ConnectOptions;
pub use db::{Connection, ConnectionBuilder, RetryState, TransactionManager};
pub use driver::{Driver, DriverConnection, MySqlDriver, PostgresDriver, SqliteDriver};
pub use error::{DbError, DbResult, ErrorKind};
pub use models::{DatabaseInfo, QueryParam};
