//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `student` rows to `Student` records and back.
//! - Expose batch create, lookup, partial update and delete.
//!
//! # Invariants
//! - Read paths reject stored rows that fail field validation.

use crate::model::student::{NewStudent, Student, StudentChange, StudentId};
use crate::model::validation::ValidationResult;
use crate::model::{EntityKind, RecordId};
use crate::repo::table::{self, TableRecord};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts all drafts atomically; records come back in input order.
    fn create(&self, students: Vec<NewStudent>) -> RepoResult<Vec<Student>>;
    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Returns every student ordered by id; empty when the table is empty.
    fn find_all(&self) -> RepoResult<Vec<Student>>;
    fn update(&self, id: StudentId, changes: &[StudentChange]) -> RepoResult<()>;
    /// Returns whether a row was removed. Missing ids are not an error.
    fn delete(&self, id: StudentId) -> RepoResult<bool>;
}

/// SQLite-backed student repository.
#[derive(Clone, Copy)]
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        table::ensure_table_ready::<Student>(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create(&self, students: Vec<NewStudent>) -> RepoResult<Vec<Student>> {
        table::insert_batch(self.conn, students)
    }

    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        table::select_by_id(self.conn, id)
    }

    fn find_all(&self) -> RepoResult<Vec<Student>> {
        table::select_all(self.conn)
    }

    fn update(&self, id: StudentId, changes: &[StudentChange]) -> RepoResult<()> {
        table::update_columns::<Student>(self.conn, id, changes)
    }

    fn delete(&self, id: StudentId) -> RepoResult<bool> {
        Ok(table::delete_by_id::<Student>(self.conn, id)? > 0)
    }
}

impl TableRecord for Student {
    type Draft = NewStudent;
    type Change = StudentChange;

    const KIND: EntityKind = EntityKind::Student;
    const INSERT_COLUMNS: &'static [&'static str] = &["name", "major", "year", "gpa"];
    const SELECT_COLUMNS: &'static [&'static str] = &["id", "name", "major", "year", "gpa"];

    fn validate_draft(draft: &NewStudent) -> ValidationResult<()> {
        draft.validate()
    }

    fn insert_values(draft: &NewStudent) -> Vec<Value> {
        vec![
            Value::Text(draft.name().to_string()),
            Value::Text(draft.major().to_string()),
            Value::Integer(i64::from(draft.year())),
            Value::Real(draft.gpa()),
        ]
    }

    fn into_record(draft: NewStudent, id: RecordId) -> Self {
        draft.into_record(id)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id: StudentId = row.get("id")?;
        let draft = NewStudent::new(
            row.get::<_, String>("name")?,
            row.get::<_, String>("major")?,
            row.get("year")?,
            row.get("gpa")?,
        )
        .map_err(|err| RepoError::InvalidData(format!("student row {id}: {err}")))?;
        Ok(draft.into_record(id))
    }
}
