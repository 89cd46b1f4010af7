//! SQLite driver backed by a single sqlx connection.
//!
//! The database descriptor's `database` field is the file path; host and
//! port are unused. Missing database files are created on open.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions};
use sqlx::{Connection, Executor, Sqlite, SqliteConnection};
use tracing::{debug, warn};

use crate::driver::{Driver, DriverConnection};
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseInfo, QueryParam};

/// Driver for SQLite database files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

#[async_trait]
impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn format_uri(&self, info: &DatabaseInfo) -> String {
        format!("sqlite://{}", info.database)
    }

    fn is_valid_uri(&self, uri: &str) -> bool {
        let path = uri
            .strip_prefix("sqlite://")
            .or_else(|| uri.strip_prefix("sqlite:"));
        path.is_some_and(|p| !p.is_empty())
    }

    async fn open(&self, uri: &str) -> DbResult<Box<dyn DriverConnection>> {
        let options = SqliteConnectOptions::from_str(uri)
            .map_err(|e| {
                DbError::configuration(
                    format!("Invalid SQLite connection URI: {}", e),
                    "Check the URI format: sqlite:path/to/db.sqlite",
                )
            })?
            .create_if_missing(true);
        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(DbError::from)?;
        Ok(Box::new(SqliteDriverConnection {
            conn: Some(conn),
            auto_commit: true,
            in_transaction: false,
        }))
    }
}

/// Single SQLite connection with emulated auto-commit.
pub struct SqliteDriverConnection {
    conn: Option<SqliteConnection>,
    auto_commit: bool,
    in_transaction: bool,
}

impl SqliteDriverConnection {
    fn inner(&mut self, operation: &str) -> DbResult<&mut SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| DbError::not_connected(operation))
    }
}

#[async_trait]
impl DriverConnection for SqliteDriverConnection {
    async fn execute(&mut self, sql: &str) -> DbResult<u64> {
        debug!(sql = %sql, "Executing statement (SQLite)");
        let conn = self.inner("execute")?;
        let result = conn.execute(sql).await.map_err(DbError::from)?;
        Ok(result.rows_affected())
    }

    async fn prepare_execute(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        debug!(sql = %sql, params = params.len(), "Executing prepared statement (SQLite)");
        let conn = self.inner("prepare_execute")?;
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let result = query.execute(&mut *conn).await.map_err(DbError::from)?;
        Ok(result.rows_affected())
    }

    async fn call(&mut self, sql: &str) -> DbResult<u64> {
        let _ = self.inner("call")?;
        Err(DbError::execution(
            format!("SQLite does not support stored procedures: {}", sql),
            None,
            "Use execute() with plain statements instead",
        ))
    }

    async fn set_auto_commit(&mut self, enabled: bool) -> DbResult<()> {
        if enabled {
            if self.in_transaction {
                self.inner("set_auto_commit")?
                    .execute("COMMIT")
                    .await
                    .map_err(DbError::from)?;
                self.in_transaction = false;
            }
            self.auto_commit = true;
        } else {
            if !self.in_transaction {
                self.inner("set_auto_commit")?
                    .execute("BEGIN")
                    .await
                    .map_err(DbError::from)?;
                self.in_transaction = true;
            }
            self.auto_commit = false;
        }
        Ok(())
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    async fn commit(&mut self) -> DbResult<()> {
        if !self.in_transaction {
            return Err(DbError::configuration(
                "no open transaction to commit",
                "Disable auto-commit before committing",
            ));
        }
        self.inner("commit")?
            .execute("COMMIT")
            .await
            .map_err(DbError::from)?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        if !self.in_transaction {
            return Err(DbError::configuration(
                "no open transaction to roll back",
                "Disable auto-commit before rolling back",
            ));
        }
        self.inner("rollback")?
            .execute("ROLLBACK")
            .await
            .map_err(DbError::from)?;
        self.in_transaction = false;
        Ok(())
    }

    async fn server_version(&mut self) -> Option<String> {
        let conn = self.conn.as_mut()?;
        match sqlx::query_scalar::<_, String>("SELECT sqlite_version()")
            .fetch_one(&mut *conn)
            .await
        {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "Failed to get server version");
                None
            }
        }
    }

    async fn close(&mut self) -> DbResult<()> {
        match self.conn.take() {
            Some(conn) => conn.close().await.map_err(DbError::from),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
        // SQLite doesn't have native JSON type, store as string
        QueryParam::Json(v) => query.bind(v.to_string()),
    }
}
