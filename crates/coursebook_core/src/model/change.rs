//! Partial-update vocabulary shared by all entities.
//!
//! # Responsibility
//! - Describe one column change as a typed value (`ColumnChange`).
//! - Convert string-keyed change maps into typed changes with an allow-list.
//!
//! # Invariants
//! - A change set is non-empty and targets each column at most once.
//! - Keys outside `ColumnChange::ALLOWED_COLUMNS` never reach storage.

use crate::model::validation::{ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dynamically typed value used by string-keyed update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Date(NaiveDate),
}

impl FieldValue {
    /// Short kind name used in type-mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Date(_) => "date",
        }
    }

    pub fn into_text(self, field: &'static str) -> ValidationResult<String> {
        match self {
            Self::Text(value) => Ok(value),
            other => Err(ValidationError::TypeMismatch {
                field,
                expected: "text",
                actual: other.kind(),
            }),
        }
    }

    pub fn into_integer(self, field: &'static str) -> ValidationResult<i64> {
        match self {
            Self::Integer(value) => Ok(value),
            other => Err(ValidationError::TypeMismatch {
                field,
                expected: "integer",
                actual: other.kind(),
            }),
        }
    }

    /// Integers widen to real; every other kind is rejected.
    pub fn into_real(self, field: &'static str) -> ValidationResult<f64> {
        match self {
            Self::Real(value) => Ok(value),
            Self::Integer(value) => Ok(value as f64),
            other => Err(ValidationError::TypeMismatch {
                field,
                expected: "real",
                actual: other.kind(),
            }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One allowed column update for an entity.
///
/// Implemented by per-entity enums whose variants are the allow-list.
pub trait ColumnChange: Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;
    /// Column names accepted by `from_column`.
    const ALLOWED_COLUMNS: &'static [&'static str];

    /// Storage column written by this change.
    fn column(&self) -> &'static str;
    /// New value for the column.
    fn value(&self) -> FieldValue;
    /// Checks the new value against the column's field rules.
    fn validate(&self) -> ValidationResult<()>;
    /// Builds a typed change from a column name and dynamic value.
    fn from_column(column: &str, value: FieldValue) -> ValidationResult<Self>;
}

/// Converts a string-keyed change mapping into typed changes.
///
/// Fails on the first key outside the allow-list or value of the wrong kind.
pub fn parse_changes<C, K, I>(changes: I) -> ValidationResult<Vec<C>>
where
    C: ColumnChange,
    K: AsRef<str>,
    I: IntoIterator<Item = (K, FieldValue)>,
{
    changes
        .into_iter()
        .map(|(key, value)| C::from_column(key.as_ref(), value))
        .collect()
}

/// Validates a typed change set before any statement is built.
pub fn check_change_set<C: ColumnChange>(changes: &[C]) -> ValidationResult<()> {
    if changes.is_empty() {
        return Err(ValidationError::EmptyChangeSet { entity: C::ENTITY });
    }

    let mut seen = BTreeSet::new();
    for change in changes {
        let column = change.column();
        if !C::ALLOWED_COLUMNS.contains(&column) {
            return Err(ValidationError::UnknownUpdateKey {
                entity: C::ENTITY,
                key: column.to_string(),
            });
        }
        if !seen.insert(column) {
            return Err(ValidationError::DuplicateUpdateKey {
                entity: C::ENTITY,
                key: column,
            });
        }
        change.validate()?;
    }

    Ok(())
}

pub(crate) fn unknown_key<C: ColumnChange>(column: &str) -> ValidationError {
    ValidationError::UnknownUpdateKey {
        entity: C::ENTITY,
        key: column.to_string(),
    }
}
