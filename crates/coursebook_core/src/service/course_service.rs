//! Course use-case service.

use crate::model::change::{check_change_set, parse_changes, FieldValue};
use crate::model::course::{Course, CourseChange, CourseId, NewCourse};
use crate::model::validation::{validate_id, validate_non_empty};
use crate::model::EntityKind;
use crate::repo::course_repo::CourseRepository;
use crate::service::{non_empty, ServiceError, ServiceResult};
use log::info;

/// Course service facade over repository implementations.
pub struct CourseService<R: CourseRepository> {
    repo: R,
}

impl<R: CourseRepository> CourseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn register_courses(&self, courses: Vec<NewCourse>) -> ServiceResult<Vec<Course>> {
        validate_non_empty("courses", &courses)?;
        for course in &courses {
            course.validate()?;
        }

        let created = self.repo.create(courses)?;
        info!(
            "event=register module=service status=ok entity=course count={}",
            created.len()
        );
        Ok(created)
    }

    pub fn update_course(&self, id: CourseId, changes: &[CourseChange]) -> ServiceResult<Course> {
        validate_id("course_id", id)?;
        check_change_set(changes)?;
        self.find_course_by_id(id)?;

        self.repo.update(id, changes)?;
        self.find_course_by_id(id)
    }

    pub fn update_course_columns<K, I>(&self, id: CourseId, changes: I) -> ServiceResult<Course>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let changes = parse_changes::<CourseChange, _, _>(changes)?;
        self.update_course(id, &changes)
    }

    /// Deletes a course and, through the store, its enrollments.
    pub fn remove_course(&self, id: CourseId) -> ServiceResult<()> {
        validate_id("course_id", id)?;
        self.repo.delete(id)?;
        Ok(())
    }

    pub fn find_course_by_id(&self, id: CourseId) -> ServiceResult<Course> {
        validate_id("course_id", id)?;
        self.repo.find_by_id(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Course,
            id,
        })
    }

    pub fn find_all_courses(&self) -> ServiceResult<Vec<Course>> {
        non_empty(EntityKind::Course, self.repo.find_all()?)
    }
}
