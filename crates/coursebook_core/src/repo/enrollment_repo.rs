//! Enrollment repository contract and SQLite implementation.
//!
//! # Invariants
//! - `enrollment_date` is stored as ISO `YYYY-MM-DD` text.
//! - Foreign key failures on create surface as `RepoError::Db` and roll back
//!   the whole batch.

use crate::model::course::CourseId;
use crate::model::enrollment::{Enrollment, EnrollmentChange, EnrollmentId, NewEnrollment};
use crate::model::student::StudentId;
use crate::model::validation::ValidationResult;
use crate::model::{EntityKind, RecordId};
use crate::repo::table::{self, TableRecord};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

/// Repository interface for enrollment persistence.
pub trait EnrollmentRepository {
    fn create(&self, enrollments: Vec<NewEnrollment>) -> RepoResult<Vec<Enrollment>>;
    fn find_by_id(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    /// First enrollment (lowest id) of a student in a course.
    fn find_by_student_and_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>>;
    fn find_all(&self) -> RepoResult<Vec<Enrollment>>;
    fn update(&self, id: EnrollmentId, changes: &[EnrollmentChange]) -> RepoResult<()>;
    fn delete(&self, id: EnrollmentId) -> RepoResult<bool>;
}

/// SQLite-backed enrollment repository.
#[derive(Clone, Copy)]
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        table::ensure_table_ready::<Enrollment>(conn)?;
        Ok(Self { conn })
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn create(&self, enrollments: Vec<NewEnrollment>) -> RepoResult<Vec<Enrollment>> {
        table::insert_batch(self.conn, enrollments)
    }

    fn find_by_id(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        table::select_by_id(self.conn, id)
    }

    fn find_by_student_and_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<Option<Enrollment>> {
        let matches = table::select_where::<Enrollment, _>(
            self.conn,
            "student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
        )?;
        Ok(matches.into_iter().next())
    }

    fn find_all(&self) -> RepoResult<Vec<Enrollment>> {
        table::select_all(self.conn)
    }

    fn update(&self, id: EnrollmentId, changes: &[EnrollmentChange]) -> RepoResult<()> {
        table::update_columns::<Enrollment>(self.conn, id, changes)
    }

    fn delete(&self, id: EnrollmentId) -> RepoResult<bool> {
        Ok(table::delete_by_id::<Enrollment>(self.conn, id)? > 0)
    }
}

impl TableRecord for Enrollment {
    type Draft = NewEnrollment;
    type Change = EnrollmentChange;

    const KIND: EntityKind = EntityKind::Enrollment;
    const INSERT_COLUMNS: &'static [&'static str] =
        &["student_id", "course_id", "enrollment_date", "grade"];
    const SELECT_COLUMNS: &'static [&'static str] =
        &["id", "student_id", "course_id", "enrollment_date", "grade"];

    fn validate_draft(draft: &NewEnrollment) -> ValidationResult<()> {
        draft.validate()
    }

    fn insert_values(draft: &NewEnrollment) -> Vec<Value> {
        vec![
            Value::Integer(draft.student_id()),
            Value::Integer(draft.course_id()),
            Value::Text(table::format_date(draft.date())),
            Value::Integer(draft.grade()),
        ]
    }

    fn into_record(draft: NewEnrollment, id: RecordId) -> Self {
        draft.into_record(id)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id: EnrollmentId = row.get("id")?;
        let date_text: String = row.get("enrollment_date")?;
        let draft = NewEnrollment::with_date(
            row.get("student_id")?,
            row.get("course_id")?,
            row.get("grade")?,
            table::parse_date(&date_text, "enrollment.enrollment_date")?,
        )
        .map_err(|err| RepoError::InvalidData(format!("enrollment row {id}: {err}")))?;
        Ok(draft.into_record(id))
    }
}
