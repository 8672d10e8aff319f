//! Cross-entity report queries.
//!
//! # Responsibility
//! - Join students, courses and enrollments in memory for report views.
//!
//! # Invariants
//! - Each query loads full collections and filters locally; there is no query
//!   pushdown, so result order follows student/course id order.
//! - Empty tables yield empty reports, not errors.

use crate::model::course::{Course, CourseId};
use crate::model::enrollment::Enrollment;
use crate::model::student::{Student, StudentId};
use crate::model::validation::{validate_gpa, validate_id, validate_text, ValidationError};
use crate::repo::course_repo::CourseRepository;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::repo::student_repo::StudentRepository;
use crate::service::ServiceResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Average grade of one course across its enrollments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAverage {
    pub course: Course,
    pub average: f64,
    /// Number of enrollments the average was computed from.
    pub enrollments: usize,
}

/// Report service over one repository of each entity.
pub struct ReportService<S, C, E> {
    students: S,
    courses: C,
    enrollments: E,
}

impl<S, C, E> ReportService<S, C, E>
where
    S: StudentRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    pub fn new(students: S, courses: C, enrollments: E) -> Self {
        Self {
            students,
            courses,
            enrollments,
        }
    }

    /// Distinct ids of students enrolled in any course of `department`, in
    /// first-enrollment order.
    pub fn student_ids_by_department(&self, department: &str) -> ServiceResult<Vec<StudentId>> {
        validate_text("department", department)?;

        let course_ids: HashSet<CourseId> = self
            .courses
            .find_all()?
            .into_iter()
            .filter(|course| course.department == department)
            .map(|course| course.id())
            .collect();

        let mut seen = HashSet::new();
        Ok(self
            .enrollments
            .find_all()?
            .into_iter()
            .filter(|enrollment| course_ids.contains(&enrollment.course_id))
            .map(|enrollment| enrollment.student_id)
            .filter(|student_id| seen.insert(*student_id))
            .collect())
    }

    /// Students with at least one enrollment matching `predicate`.
    pub fn students_by_enrollment<P>(&self, mut predicate: P) -> ServiceResult<Vec<Student>>
    where
        P: FnMut(&Enrollment) -> bool,
    {
        let student_ids: HashSet<StudentId> = self
            .enrollments
            .find_all()?
            .iter()
            .filter(|enrollment| predicate(enrollment))
            .map(|enrollment| enrollment.student_id)
            .collect();

        Ok(self
            .students
            .find_all()?
            .into_iter()
            .filter(|student| student_ids.contains(&student.id()))
            .collect())
    }

    /// Students enrolled in `course_id` strictly after `date`.
    pub fn students_in_course_after(
        &self,
        course_id: CourseId,
        date: NaiveDate,
    ) -> ServiceResult<Vec<Student>> {
        validate_id("course_id", course_id)?;
        self.students_by_enrollment(|enrollment| {
            enrollment.course_id == course_id && enrollment.date > date
        })
    }

    /// Students with GPA strictly above `gpa` enrolled in `department`.
    pub fn students_above_gpa_in_department(
        &self,
        gpa: f64,
        department: &str,
    ) -> ServiceResult<Vec<Student>> {
        validate_gpa(gpa)?;
        let in_department: HashSet<StudentId> = self
            .student_ids_by_department(department)?
            .into_iter()
            .collect();

        Ok(self
            .students
            .find_all()?
            .into_iter()
            .filter(|student| student.gpa > gpa && in_department.contains(&student.id()))
            .collect())
    }

    /// Courses whose average grade is strictly above `min_average`.
    ///
    /// Courses without enrollments have no average and are skipped.
    pub fn courses_with_average_above(&self, min_average: f64) -> ServiceResult<Vec<CourseAverage>> {
        if !min_average.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "min_average",
            }
            .into());
        }

        let mut totals: HashMap<CourseId, (i64, usize)> = HashMap::new();
        for enrollment in self.enrollments.find_all()? {
            let entry = totals.entry(enrollment.course_id).or_insert((0, 0));
            entry.0 += enrollment.grade;
            entry.1 += 1;
        }

        Ok(self
            .courses
            .find_all()?
            .into_iter()
            .filter_map(|course| {
                let (sum, count) = totals.get(&course.id()).copied()?;
                let average = sum as f64 / count as f64;
                (average > min_average).then_some(CourseAverage {
                    course,
                    average,
                    enrollments: count,
                })
            })
            .collect())
    }
}
