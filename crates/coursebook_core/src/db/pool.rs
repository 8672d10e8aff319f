//! Bounded SQLite connection pool on `r2d2`.
//!
//! # Responsibility
//! - Reuse configured file connections across repository calls.
//! - Bound the number of open connections and the time spent waiting for one.
//!
//! # Invariants
//! - At most `max_pool_size` connections are open at any time.
//! - Every pooled connection has `foreign_keys=ON` and the busy timeout set.
//! - Migrations run once, on the first checkout inside `ConnectionPool::open`.
//! - A connection returned mid-transaction is rolled back before reuse.

use super::migrations::apply_migrations;
use super::open::configure_connection;
use super::{DbError, DbResult};
use crate::config::DatabaseConfig;
use log::{info, warn};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Shared handle to a bounded pool; clones refer to the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl ConnectionPool {
    /// Builds the pool and migrates the database file through its first
    /// connection.
    ///
    /// # Errors
    /// - `DbError::Pool` when connections cannot be established in time.
    /// - `DbError` from migrations on an incompatible schema.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(&config.path)
            .with_init(|conn: &mut Connection| configure_connection(conn));
        let inner = Pool::builder()
            .max_size(config.max_pool_size.max(1))
            .connection_timeout(config.connect_timeout())
            .build(manager)
            .map_err(DbError::Pool)?;

        let mut first = inner.get().map_err(DbError::Pool)?;
        apply_migrations(&mut first)?;
        drop(first);

        info!(
            "event=pool_open module=db status=ok max_size={}",
            config.max_pool_size
        );
        Ok(Self {
            inner,
            path: config.path.clone(),
        })
    }

    /// Checks out a connection, blocking up to the connect timeout.
    ///
    /// # Errors
    /// - `DbError::PoolTimeout` when no connection became available in time.
    pub fn get(&self) -> DbResult<PooledConnection> {
        let started_at = Instant::now();
        match self.inner.get() {
            Ok(conn) => Ok(PooledConnection { conn }),
            Err(err) => {
                let waited = started_at.elapsed();
                warn!(
                    "event=pool_checkout module=db status=error error_code=pool_timeout waited_ms={} max_size={} error={}",
                    waited.as_millis(),
                    self.max_size(),
                    err
                );
                Err(DbError::PoolTimeout {
                    waited,
                    max_size: self.max_size(),
                })
            }
        }
    }

    pub fn max_size(&self) -> u32 {
        self.inner.max_size()
    }

    /// Number of open connections currently waiting in the pool.
    pub fn idle_count(&self) -> u32 {
        self.inner.state().idle_connections
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Connection checked out of a `ConnectionPool`; returned on drop.
pub struct PooledConnection {
    conn: r2d2::PooledConnection<SqliteConnectionManager>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if self.conn.is_autocommit() {
            return;
        }
        match self.conn.execute_batch("ROLLBACK;") {
            Ok(()) => warn!("event=pool_release module=db status=rolled_back reason=open_transaction"),
            Err(err) => warn!(
                "event=pool_release module=db status=error reason=open_transaction error={err}"
            ),
        }
    }
}
