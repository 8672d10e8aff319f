//! Enrollment draft, record and column changes.
//!
//! # Invariants
//! - `student_id` / `course_id` are non-negative; their existence is checked by
//!   the store's foreign keys, not in process.
//! - `date` defaults to the local calendar date at draft construction.

use crate::model::change::{unknown_key, ColumnChange, FieldValue};
use crate::model::course::CourseId;
use crate::model::student::StudentId;
use crate::model::validation::{validate_grade, validate_id, ValidationError, ValidationResult};
use crate::model::RecordId;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type EnrollmentId = RecordId;

/// Unpersisted enrollment of one student in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnrollmentFields")]
pub struct NewEnrollment {
    student_id: StudentId,
    course_id: CourseId,
    grade: i64,
    date: NaiveDate,
}

impl NewEnrollment {
    /// Builds a validated draft dated today.
    pub fn new(student_id: StudentId, course_id: CourseId, grade: i64) -> ValidationResult<Self> {
        Self::with_date(student_id, course_id, grade, Local::now().date_naive())
    }

    /// Builds a validated draft with an explicit enrollment date.
    ///
    /// Used by import paths where the enrollment happened in the past.
    pub fn with_date(
        student_id: StudentId,
        course_id: CourseId,
        grade: i64,
        date: NaiveDate,
    ) -> ValidationResult<Self> {
        let draft = Self {
            student_id,
            course_id,
            grade,
            date,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("student_id", self.student_id)?;
        validate_id("course_id", self.course_id)?;
        validate_grade(self.grade)
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn grade(&self) -> i64 {
        self.grade
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn into_record(self, id: EnrollmentId) -> Enrollment {
        Enrollment {
            id,
            student_id: self.student_id,
            course_id: self.course_id,
            grade: self.grade,
            date: self.date,
        }
    }
}

/// Deserialized draft; a missing `date` means today.
#[derive(Deserialize)]
struct EnrollmentFields {
    student_id: StudentId,
    course_id: CourseId,
    grade: i64,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl TryFrom<EnrollmentFields> for NewEnrollment {
    type Error = ValidationError;

    fn try_from(fields: EnrollmentFields) -> ValidationResult<Self> {
        match fields.date {
            Some(date) => Self::with_date(fields.student_id, fields.course_id, fields.grade, date),
            None => Self::new(fields.student_id, fields.course_id, fields.grade),
        }
    }
}

/// Persisted enrollment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub grade: i64,
    /// Stored as `enrollment_date`.
    pub date: NaiveDate,
}

impl Enrollment {
    pub fn id(&self) -> EnrollmentId {
        self.id
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("student_id", self.student_id)?;
        validate_id("course_id", self.course_id)?;
        validate_grade(self.grade)
    }
}

impl Display for Enrollment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Enrollment #{}: student {} in course {} on {} grade {}",
            self.id(), self.student_id, self.course_id, self.date, self.grade
        )
    }
}

/// Allowed enrollment updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentChange {
    CourseId(CourseId),
    Grade(i64),
}

impl ColumnChange for EnrollmentChange {
    const ENTITY: &'static str = "enrollment";
    const ALLOWED_COLUMNS: &'static [&'static str] = &["course_id", "grade"];

    fn column(&self) -> &'static str {
        match self {
            Self::CourseId(_) => "course_id",
            Self::Grade(_) => "grade",
        }
    }

    fn value(&self) -> FieldValue {
        match self {
            Self::CourseId(value) | Self::Grade(value) => FieldValue::Integer(*value),
        }
    }

    fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::CourseId(value) => validate_id("course_id", *value),
            Self::Grade(value) => validate_grade(*value),
        }
    }

    fn from_column(column: &str, value: FieldValue) -> ValidationResult<Self> {
        match column {
            "course_id" => Ok(Self::CourseId(value.into_integer("course_id")?)),
            "grade" => Ok(Self::Grade(value.into_integer("grade")?)),
            other => Err(unknown_key::<Self>(other)),
        }
    }
}
