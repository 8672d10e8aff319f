//! Course draft, record and column changes.

use crate::model::change::{unknown_key, ColumnChange, FieldValue};
use crate::model::validation::{
    validate_credits, validate_text, ValidationError, ValidationResult,
};
use crate::model::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type CourseId = RecordId;

/// Unpersisted course. Fields are validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CourseFields")]
pub struct NewCourse {
    title: String,
    department: String,
    credits: i64,
}

impl NewCourse {
    /// Builds a validated draft.
    ///
    /// # Errors
    /// - `title` or `department` blank.
    /// - `credits` outside 1..=6.
    pub fn new(
        title: impl Into<String>,
        department: impl Into<String>,
        credits: i64,
    ) -> ValidationResult<Self> {
        let draft = Self {
            title: title.into(),
            department: department.into(),
            credits,
        };
        draft.validate()?;
        Ok(draft)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_text("title", &self.title)?;
        validate_text("department", &self.department)?;
        validate_credits(self.credits)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn credits(&self) -> i64 {
        self.credits
    }

    pub(crate) fn into_record(self, id: CourseId) -> Course {
        Course {
            id,
            title: self.title,
            department: self.department,
            credits: self.credits,
        }
    }
}

#[derive(Deserialize)]
struct CourseFields {
    title: String,
    department: String,
    credits: i64,
}

impl TryFrom<CourseFields> for NewCourse {
    type Error = ValidationError;

    fn try_from(fields: CourseFields) -> ValidationResult<Self> {
        Self::new(fields.title, fields.department, fields.credits)
    }
}

/// Persisted course row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    id: CourseId,
    pub title: String,
    pub department: String,
    pub credits: i64,
}

impl Course {
    pub fn id(&self) -> CourseId {
        self.id
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_text("title", &self.title)?;
        validate_text("department", &self.department)?;
        validate_credits(self.credits)
    }
}

impl Display for Course {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Course #{}: {} [{}] {} credits",
            self.id(), self.title, self.department, self.credits
        )
    }
}

/// Allowed course updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseChange {
    Title(String),
    Department(String),
    Credits(i64),
}

impl ColumnChange for CourseChange {
    const ENTITY: &'static str = "course";
    const ALLOWED_COLUMNS: &'static [&'static str] = &["title", "department", "credits"];

    fn column(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Department(_) => "department",
            Self::Credits(_) => "credits",
        }
    }

    fn value(&self) -> FieldValue {
        match self {
            Self::Title(value) | Self::Department(value) => FieldValue::Text(value.clone()),
            Self::Credits(value) => FieldValue::Integer(*value),
        }
    }

    fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Title(value) => validate_text("title", value),
            Self::Department(value) => validate_text("department", value),
            Self::Credits(value) => validate_credits(*value),
        }
    }

    fn from_column(column: &str, value: FieldValue) -> ValidationResult<Self> {
        match column {
            "title" => Ok(Self::Title(value.into_text("title")?)),
            "department" => Ok(Self::Department(value.into_text("department")?)),
            "credits" => Ok(Self::Credits(value.into_integer("credits")?)),
            other => Err(unknown_key::<Self>(other)),
        }
    }
}
