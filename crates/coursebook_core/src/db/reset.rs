//! Record reset helper used by demo seeding and tests.

use super::DbResult;
use log::info;
use rusqlite::Connection;

/// Deletes every student, course and enrollment row and restarts id sequences.
///
/// Runs in one transaction; enrollments are removed first so foreign keys hold
/// at every step.
pub fn reset_records(conn: &Connection) -> DbResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "DELETE FROM enrollment;
         DELETE FROM course;
         DELETE FROM student;
         DELETE FROM sqlite_sequence WHERE name IN ('student', 'course', 'enrollment');",
    )?;
    tx.commit()?;
    info!("event=records_reset module=db status=ok");
    Ok(())
}
