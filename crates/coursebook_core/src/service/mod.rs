//! Core use-case services.
//!
//! # Responsibility
//! - Re-validate caller input before it reaches repositories.
//! - Turn repository outcomes into typed domain conditions.
//! - Host cross-entity queries computed in memory.
//!
//! # Invariants
//! - Validation failures never issue SQL.
//! - Storage failures are wrapped as `ServiceError::Repo` without retry.

pub mod course_service;
pub mod enrollment_service;
pub mod report_service;
pub mod student_service;

use crate::model::course::CourseId;
use crate::model::student::StudentId;
use crate::model::validation::ValidationError;
use crate::model::{EntityKind, RecordId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every service.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any storage access.
    Validation(ValidationError),
    NotFound {
        entity: EntityKind,
        id: RecordId,
    },
    EnrollmentNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },
    /// The entity table holds no rows.
    NoneFound(EntityKind),
    /// Storage failure (connectivity, constraint, schema).
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::EnrollmentNotFound {
                student_id,
                course_id,
            } => write!(
                f,
                "enrollment not found for student {student_id} in course {course_id}"
            ),
            Self::NoneFound(entity) => write!(f, "no {entity} records found"),
            Self::Repo(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// Turns an empty listing into `NoneFound`.
fn non_empty<T>(entity: EntityKind, items: Vec<T>) -> ServiceResult<Vec<T>> {
    if items.is_empty() {
        return Err(ServiceError::NoneFound(entity));
    }
    Ok(items)
}
