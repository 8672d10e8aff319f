//! Student use-case service.
//!
//! # Responsibility
//! - Register, update, remove and look up students.
//! - Provide predicate filters over the full student list.
//!
//! # Invariants
//! - Mutations on a missing id fail with `ServiceError::NotFound` before the
//!   update statement runs.

use crate::model::change::{check_change_set, parse_changes, FieldValue};
use crate::model::student::{NewStudent, Student, StudentChange, StudentId};
use crate::model::validation::{validate_gpa, validate_id, validate_non_empty};
use crate::model::EntityKind;
use crate::repo::student_repo::StudentRepository;
use crate::service::{non_empty, ServiceError, ServiceResult};
use log::info;

/// Student service facade over repository implementations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a batch of drafts and returns the created records in order.
    pub fn register_students(&self, students: Vec<NewStudent>) -> ServiceResult<Vec<Student>> {
        validate_non_empty("students", &students)?;
        for student in &students {
            student.validate()?;
        }

        let created = self.repo.create(students)?;
        info!(
            "event=register module=service status=ok entity=student count={}",
            created.len()
        );
        Ok(created)
    }

    /// Applies typed changes and returns the updated record.
    pub fn update_student(
        &self,
        id: StudentId,
        changes: &[StudentChange],
    ) -> ServiceResult<Student> {
        validate_id("student_id", id)?;
        check_change_set(changes)?;
        self.find_student_by_id(id)?;

        self.repo.update(id, changes)?;
        self.find_student_by_id(id)
    }

    /// String-keyed variant of `update_student`; unknown keys are rejected.
    pub fn update_student_columns<K, I>(&self, id: StudentId, changes: I) -> ServiceResult<Student>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let changes = parse_changes::<StudentChange, _, _>(changes)?;
        self.update_student(id, &changes)
    }

    /// Deletes a student and, through the store, their enrollments.
    pub fn remove_student(&self, id: StudentId) -> ServiceResult<()> {
        validate_id("student_id", id)?;
        self.repo.delete(id)?;
        Ok(())
    }

    pub fn find_student_by_id(&self, id: StudentId) -> ServiceResult<Student> {
        validate_id("student_id", id)?;
        self.repo
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Student,
                id,
            })
    }

    /// All students; `NoneFound` when there are none.
    pub fn find_all_students(&self) -> ServiceResult<Vec<Student>> {
        non_empty(EntityKind::Student, self.repo.find_all()?)
    }

    /// Students matching `predicate`, in id order. Empty is not an error.
    pub fn find_students<P>(&self, mut predicate: P) -> ServiceResult<Vec<Student>>
    where
        P: FnMut(&Student) -> bool,
    {
        Ok(self
            .repo
            .find_all()?
            .into_iter()
            .filter(|student| predicate(student))
            .collect())
    }

    pub fn count_students<P>(&self, mut predicate: P) -> ServiceResult<usize>
    where
        P: FnMut(&Student) -> bool,
    {
        Ok(self
            .repo
            .find_all()?
            .iter()
            .filter(|student| predicate(student))
            .count())
    }

    /// Students whose GPA is strictly greater than `threshold`.
    pub fn students_with_gpa_above(&self, threshold: f64) -> ServiceResult<Vec<Student>> {
        validate_gpa(threshold)?;
        self.find_students(|student| student.gpa > threshold)
    }
}
