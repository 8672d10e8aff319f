//! Domain model for academic records.
//!
//! # Responsibility
//! - Define drafts (unpersisted) and records (persisted) for each entity.
//! - Own field validation and the partial-update vocabulary.
//!
//! # Invariants
//! - A draft never carries an identity; a record always does.
//! - Persisting consumes the draft, so identity is assigned exactly once.

pub mod change;
pub mod course;
pub mod enrollment;
pub mod student;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned row identity shared by every entity table.
pub type RecordId = i64;

/// Entity discriminator used by repository and service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Course,
    Enrollment,
}

impl EntityKind {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Course => "course",
            Self::Enrollment => "enrollment",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}
