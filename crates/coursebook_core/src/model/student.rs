//! Student draft, record and column changes.

use crate::model::change::{unknown_key, ColumnChange, FieldValue};
use crate::model::validation::{
    validate_gpa, validate_text, validate_text_min_len, validate_year, ValidationError,
    ValidationResult,
    MIN_STUDENT_NAME_CHARS,
};
use crate::model::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type StudentId = RecordId;

/// Unpersisted student. Fields are validated at construction, including
/// when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StudentFields")]
pub struct NewStudent {
    name: String,
    major: String,
    year: i32,
    gpa: f64,
}

impl NewStudent {
    /// Builds a validated draft.
    ///
    /// # Errors
    /// - `name` blank or shorter than 3 characters.
    /// - `major` blank.
    /// - `year` outside 1900..=current year.
    /// - `gpa` outside 0.0..=4.0 or not finite.
    pub fn new(
        name: impl Into<String>,
        major: impl Into<String>,
        year: i32,
        gpa: f64,
    ) -> ValidationResult<Self> {
        let draft = Self {
            name: name.into(),
            major: major.into(),
            year,
            gpa,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_text_min_len("name", &self.name, MIN_STUDENT_NAME_CHARS)?;
        validate_text("major", &self.major)?;
        validate_year(self.year)?;
        validate_gpa(self.gpa)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn gpa(&self) -> f64 {
        self.gpa
    }

    /// Attaches the store-assigned identity, consuming the draft.
    pub(crate) fn into_record(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            major: self.major,
            year: self.year,
            gpa: self.gpa,
        }
    }
}

/// Raw deserialized draft, checked by `NewStudent::new`.
#[derive(Deserialize)]
struct StudentFields {
    name: String,
    major: String,
    year: i32,
    gpa: f64,
}

impl TryFrom<StudentFields> for NewStudent {
    type Error = ValidationError;

    fn try_from(fields: StudentFields) -> ValidationResult<Self> {
        Self::new(fields.name, fields.major, fields.year, fields.gpa)
    }
}

/// Persisted student row. Only the repository hands these out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    id: StudentId,
    pub name: String,
    pub major: String,
    /// Enrollment year.
    pub year: i32,
    pub gpa: f64,
}

impl Student {
    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_text_min_len("name", &self.name, MIN_STUDENT_NAME_CHARS)?;
        validate_text("major", &self.major)?;
        validate_year(self.year)?;
        validate_gpa(self.gpa)
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Student #{}: {} ({}, {}) GPA {:.2}",
            self.id(), self.name, self.major, self.year, self.gpa
        )
    }
}

/// Allowed student updates. Enrollment year is immutable.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentChange {
    Name(String),
    Major(String),
    Gpa(f64),
}

impl ColumnChange for StudentChange {
    const ENTITY: &'static str = "student";
    const ALLOWED_COLUMNS: &'static [&'static str] = &["name", "major", "gpa"];

    fn column(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Major(_) => "major",
            Self::Gpa(_) => "gpa",
        }
    }

    fn value(&self) -> FieldValue {
        match self {
            Self::Name(value) | Self::Major(value) => FieldValue::Text(value.clone()),
            Self::Gpa(value) => FieldValue::Real(*value),
        }
    }

    fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Name(value) => validate_text_min_len("name", value, MIN_STUDENT_NAME_CHARS),
            Self::Major(value) => validate_text("major", value),
            Self::Gpa(value) => validate_gpa(*value),
        }
    }

    fn from_column(column: &str, value: FieldValue) -> ValidationResult<Self> {
        match column {
            "name" => Ok(Self::Name(value.into_text("name")?)),
            "major" => Ok(Self::Major(value.into_text("major")?)),
            "gpa" => Ok(Self::Gpa(value.into_real("gpa")?)),
            other => Err(unknown_key::<Self>(other)),
        }
    }
}
