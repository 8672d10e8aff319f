//! Field-level validation rules shared by models, repositories and services.
//!
//! # Responsibility
//! - Check field constraints before any entity value is constructed.
//! - Report which field failed and which constraint it violated.
//!
//! # Invariants
//! - Every check is pure: no I/O, no logging, no mutation.
//! - Text checks operate on the trimmed value.

use chrono::{Datelike, Local};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_ENROLLMENT_YEAR: i32 = 1900;
pub const MIN_STUDENT_NAME_CHARS: usize = 3;
pub const GPA_MIN: f64 = 0.0;
pub const GPA_MAX: f64 = 4.0;
pub const GRADE_MIN: i64 = 0;
pub const GRADE_MAX: i64 = 100;
pub const CREDITS_MIN: i64 = 1;
pub const CREDITS_MAX: i64 = 6;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Constraint violation detected before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Text field is empty or whitespace-only.
    EmptyText { field: &'static str },
    /// Text field is shorter than the required minimum.
    TooShort { field: &'static str, min_chars: usize },
    /// Numeric field falls outside its inclusive range.
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
        actual: String,
    },
    /// Floating point field is NaN or infinite.
    NotFinite { field: &'static str },
    /// Identity field is negative.
    NegativeId { field: &'static str, value: i64 },
    /// Batch or collection input is empty.
    EmptyCollection { field: &'static str },
    /// Update request carries no changes.
    EmptyChangeSet { entity: &'static str },
    /// Update key is not in the entity allow-list.
    UnknownUpdateKey { entity: &'static str, key: String },
    /// Two changes target the same column.
    DuplicateUpdateKey { entity: &'static str, key: &'static str },
    /// Update value kind does not match the column type.
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText { field } => write!(f, "{field} cannot be empty"),
            Self::TooShort { field, min_chars } => {
                write!(f, "{field} must have at least {min_chars} characters")
            }
            Self::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{field} must be between {min} and {max}, got {actual}"),
            Self::NotFinite { field } => write!(f, "{field} must be a finite number"),
            Self::NegativeId { field, value } => {
                write!(f, "{field} must be 0 or positive, got {value}")
            }
            Self::EmptyCollection { field } => write!(f, "{field} cannot be empty"),
            Self::EmptyChangeSet { entity } => {
                write!(f, "{entity} update requires at least one change")
            }
            Self::UnknownUpdateKey { entity, key } => {
                write!(f, "key `{key}` is not updatable on {entity}")
            }
            Self::DuplicateUpdateKey { entity, key } => {
                write!(f, "key `{key}` appears more than once in {entity} update")
            }
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{field} expects a {expected} value, got {actual}"),
        }
    }
}

impl Error for ValidationError {}

pub fn validate_id(field: &'static str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::NegativeId { field, value });
    }
    Ok(())
}

pub fn validate_text(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyText { field });
    }
    Ok(())
}

pub fn validate_text_min_len(
    field: &'static str,
    value: &str,
    min_chars: usize,
) -> ValidationResult<()> {
    validate_text(field, value)?;
    if value.trim().chars().count() < min_chars {
        return Err(ValidationError::TooShort { field, min_chars });
    }
    Ok(())
}

/// Checks `min <= value <= max`.
pub fn validate_range(field: &'static str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
            actual: value.to_string(),
        });
    }
    Ok(())
}

pub fn validate_gpa(value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field: "gpa" });
    }
    if !(GPA_MIN..=GPA_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "gpa",
            min: format!("{GPA_MIN:.1}"),
            max: format!("{GPA_MAX:.1}"),
            actual: value.to_string(),
        });
    }
    Ok(())
}

/// Enrollment year must lie between 1900 and the current local year.
pub fn validate_year(value: i32) -> ValidationResult<()> {
    validate_range(
        "year",
        i64::from(value),
        i64::from(MIN_ENROLLMENT_YEAR),
        i64::from(current_year()),
    )
}

pub fn validate_grade(value: i64) -> ValidationResult<()> {
    validate_range("grade", value, GRADE_MIN, GRADE_MAX)
}

pub fn validate_credits(value: i64) -> ValidationResult<()> {
    validate_range("credits", value, CREDITS_MIN, CREDITS_MAX)
}

pub fn validate_non_empty<T>(field: &'static str, items: &[T]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCollection { field });
    }
    Ok(())
}

pub fn current_year() -> i32 {
    Local::now().year()
}
