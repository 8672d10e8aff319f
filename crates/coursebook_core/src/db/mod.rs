//! SQLite storage bootstrap, schema migrations and connection pooling.
//!
//! # Responsibility
//! - Open and configure SQLite connections for coursebook core.
//! - Apply schema migrations in deterministic order.
//! - Hand out bounded, reusable connections to callers.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write records before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod migrations;
mod open;
pub mod pool;
mod reset;

pub use open::{open_db, open_db_in_memory};
pub use pool::{ConnectionPool, PooledConnection};
pub use reset::reset_records;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// No pooled connection became available within the connect timeout.
    PoolTimeout { waited: Duration, max_size: u32 },
    /// The pool could not be built or its first connection failed.
    Pool(r2d2::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::PoolTimeout { waited, max_size } => write!(
                f,
                "no connection available after {}ms (pool size {max_size})",
                waited.as_millis()
            ),
            Self::Pool(err) => write!(f, "failed to start connection pool: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::PoolTimeout { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
