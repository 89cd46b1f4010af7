//! Database facade layer.
//!
//! This module provides the connection handle, its builder, and the
//! transaction manager that borrows a live connection.

pub mod builder;
pub mod connection;
pub mod transaction;

pub use builder::ConnectionBuilder;
pub use connection::{Connection, RetryState};
pub use transaction::TransactionManager;
