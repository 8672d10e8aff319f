//! Enrollment use-case service.
//!
//! # Invariants
//! - Student/course existence is left to the store's foreign keys; a dangling
//!   reference fails the whole batch with `ServiceError::Repo`.

use crate::model::change::{check_change_set, parse_changes, FieldValue};
use crate::model::course::CourseId;
use crate::model::enrollment::{Enrollment, EnrollmentChange, EnrollmentId, NewEnrollment};
use crate::model::student::StudentId;
use crate::model::validation::{validate_id, validate_non_empty};
use crate::model::EntityKind;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::service::{non_empty, ServiceError, ServiceResult};
use log::info;

/// Enrollment service facade over repository implementations.
pub struct EnrollmentService<R: EnrollmentRepository> {
    repo: R,
}

impl<R: EnrollmentRepository> EnrollmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn register_enrollments(
        &self,
        enrollments: Vec<NewEnrollment>,
    ) -> ServiceResult<Vec<Enrollment>> {
        validate_non_empty("enrollments", &enrollments)?;
        for enrollment in &enrollments {
            enrollment.validate()?;
        }

        let created = self.repo.create(enrollments)?;
        info!(
            "event=register module=service status=ok entity=enrollment count={}",
            created.len()
        );
        Ok(created)
    }

    pub fn update_enrollment(
        &self,
        id: EnrollmentId,
        changes: &[EnrollmentChange],
    ) -> ServiceResult<Enrollment> {
        validate_id("enrollment_id", id)?;
        check_change_set(changes)?;
        self.find_enrollment_by_id(id)?;

        self.repo.update(id, changes)?;
        self.find_enrollment_by_id(id)
    }

    pub fn update_enrollment_columns<K, I>(
        &self,
        id: EnrollmentId,
        changes: I,
    ) -> ServiceResult<Enrollment>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let changes = parse_changes::<EnrollmentChange, _, _>(changes)?;
        self.update_enrollment(id, &changes)
    }

    pub fn remove_enrollment(&self, id: EnrollmentId) -> ServiceResult<()> {
        validate_id("enrollment_id", id)?;
        self.repo.delete(id)?;
        Ok(())
    }

    pub fn find_enrollment_by_id(&self, id: EnrollmentId) -> ServiceResult<Enrollment> {
        validate_id("enrollment_id", id)?;
        self.repo.find_by_id(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Enrollment,
            id,
        })
    }

    /// Enrollment of `student_id` in `course_id`.
    pub fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> ServiceResult<Enrollment> {
        validate_id("student_id", student_id)?;
        validate_id("course_id", course_id)?;
        self.repo
            .find_by_student_and_course(student_id, course_id)?
            .ok_or(ServiceError::EnrollmentNotFound {
                student_id,
                course_id,
            })
    }

    pub fn find_all_enrollments(&self) -> ServiceResult<Vec<Enrollment>> {
        non_empty(EntityKind::Enrollment, self.repo.find_all()?)
    }

    /// Enrollments matching `predicate`, in id order. Empty is not an error.
    pub fn find_enrollments<P>(&self, mut predicate: P) -> ServiceResult<Vec<Enrollment>>
    where
        P: FnMut(&Enrollment) -> bool,
    {
        Ok(self
            .repo
            .find_all()?
            .into_iter()
            .filter(|enrollment| predicate(enrollment))
            .collect())
    }
}
