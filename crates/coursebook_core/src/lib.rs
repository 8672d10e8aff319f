//! Core domain logic for coursebook.
//! Students, courses and enrollments over SQLite, with the business
//! invariants enforced here rather than in callers.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoursebookConfig, DatabaseConfig, LoggingConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::change::{check_change_set, parse_changes, ColumnChange, FieldValue};
pub use model::course::{Course, CourseChange, CourseId, NewCourse};
pub use model::enrollment::{Enrollment, EnrollmentChange, EnrollmentId, NewEnrollment};
pub use model::student::{NewStudent, Student, StudentChange, StudentId};
pub use model::validation::{ValidationError, ValidationResult};
pub use model::{EntityKind, RecordId};
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::course_service::CourseService;
pub use service::enrollment_service::EnrollmentService;
pub use service::report_service::{CourseAverage, ReportService};
pub use service::student_service::StudentService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
