//! Schema migrations tracked through `PRAGMA user_version`.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - All pending steps commit together or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "records_init",
    sql: include_str!("0001_init.sql"),
}];

/// Highest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();

    match from_version.cmp(&to_version) {
        std::cmp::Ordering::Greater => Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        }),
        std::cmp::Ordering::Equal => Ok(()),
        std::cmp::Ordering::Less => {
            let tx = conn.transaction()?;
            for step in SCHEMA_STEPS.iter().filter(|step| step.version > from_version) {
                run_step(&tx, step)?;
            }
            tx.commit()?;
            info!(
                "event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}"
            );
            Ok(())
        }
    }
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    info!(
        "event=db_migrate_step module=db status=ok version={} name={}",
        step.version, step.name
    );
    Ok(())
}

/// Schema version recorded on `conn`; 0 for a fresh database.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, SCHEMA_STEPS};

    #[test]
    fn steps_are_strictly_increasing_from_one() {
        let versions: Vec<u32> = SCHEMA_STEPS.iter().map(|step| step.version).collect();
        assert_eq!(versions.first(), Some(&1));
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(latest_version(), *versions.last().unwrap());
    }
}
