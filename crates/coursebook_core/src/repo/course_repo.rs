//! Course repository contract and SQLite implementation.

use crate::model::course::{Course, CourseChange, CourseId, NewCourse};
use crate::model::validation::ValidationResult;
use crate::model::{EntityKind, RecordId};
use crate::repo::table::{self, TableRecord};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

/// Repository interface for course persistence.
pub trait CourseRepository {
    fn create(&self, courses: Vec<NewCourse>) -> RepoResult<Vec<Course>>;
    fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn find_all(&self) -> RepoResult<Vec<Course>>;
    fn update(&self, id: CourseId, changes: &[CourseChange]) -> RepoResult<()>;
    fn delete(&self, id: CourseId) -> RepoResult<bool>;
}

/// SQLite-backed course repository.
#[derive(Clone, Copy)]
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        table::ensure_table_ready::<Course>(conn)?;
        Ok(Self { conn })
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create(&self, courses: Vec<NewCourse>) -> RepoResult<Vec<Course>> {
        table::insert_batch(self.conn, courses)
    }

    fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>> {
        table::select_by_id(self.conn, id)
    }

    fn find_all(&self) -> RepoResult<Vec<Course>> {
        table::select_all(self.conn)
    }

    fn update(&self, id: CourseId, changes: &[CourseChange]) -> RepoResult<()> {
        table::update_columns::<Course>(self.conn, id, changes)
    }

    fn delete(&self, id: CourseId) -> RepoResult<bool> {
        Ok(table::delete_by_id::<Course>(self.conn, id)? > 0)
    }
}

impl TableRecord for Course {
    type Draft = NewCourse;
    type Change = CourseChange;

    const KIND: EntityKind = EntityKind::Course;
    const INSERT_COLUMNS: &'static [&'static str] = &["title", "department", "credits"];
    const SELECT_COLUMNS: &'static [&'static str] = &["id", "title", "department", "credits"];

    fn validate_draft(draft: &NewCourse) -> ValidationResult<()> {
        draft.validate()
    }

    fn insert_values(draft: &NewCourse) -> Vec<Value> {
        vec![
            Value::Text(draft.title().to_string()),
            Value::Text(draft.department().to_string()),
            Value::Integer(draft.credits()),
        ]
    }

    fn into_record(draft: NewCourse, id: RecordId) -> Self {
        draft.into_record(id)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id: CourseId = row.get("id")?;
        let draft = NewCourse::new(
            row.get::<_, String>("title")?,
            row.get::<_, String>("department")?,
            row.get("credits")?,
        )
        .map_err(|err| RepoError::InvalidData(format!("course row {id}: {err}")))?;
        Ok(draft.into_record(id))
    }
}
