//! Connection handle construction.

use std::sync::Arc;

use crate::config::ConnectOptions;
use crate::db::connection::Connection;
use crate::driver::Driver;
use crate::models::DatabaseInfo;

/// Immutable configuration holder that produces [`Connection`] handles.
///
/// Holds a database descriptor, a driver, and an option bag. `build()` has
/// no side effects beyond constructing the handle; nothing is opened until
/// [`Connection::connect`] is called.
#[derive(Clone)]
pub struct ConnectionBuilder {
    info: DatabaseInfo,
    driver: Arc<dyn Driver>,
    options: ConnectOptions,
}

impl ConnectionBuilder {
    /// Create a builder for the given database and driver.
    pub fn new(info: DatabaseInfo, driver: Arc<dyn Driver>) -> Self {
        Self {
            info,
            driver,
            options: ConnectOptions::default(),
        }
    }

    /// Set the connection options.
    pub fn options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// Produce a fresh, not-yet-connected handle.
    pub fn build(&self) -> Connection {
        Connection::new(
            self.driver.clone(),
            self.info.clone(),
            self.options.clone(),
        )
    }
}

impl std::fmt::Debug for ConnectionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionBuilder")
            .field("driver", &self.driver.name())
            .field("host", &self.info.host)
            .field("database", &self.info.database)
            .field("options", &self.options)
            .finish()
    }
}
