use chrono::NaiveDate;
use coursebook_core::db::open_db_in_memory;
use coursebook_core::{
    Course, CourseRepository, EnrollmentChange, EnrollmentRepository, EnrollmentService,
    EntityKind, FieldValue, NewCourse, NewEnrollment, NewStudent, RepoError, ServiceError,
    SqliteCourseRepository, SqliteEnrollmentRepository, SqliteStudentRepository, Student,
    StudentRepository, ValidationError,
};
use rusqlite::Connection;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed(conn: &Connection) -> (Vec<Student>, Vec<Course>) {
    let students = SqliteStudentRepository::try_new(conn)
        .unwrap()
        .create(vec![
            NewStudent::new("Ann Lee", "CS", 2001, 3.8).unwrap(),
            NewStudent::new("Bob Ray", "Math", 2002, 3.2).unwrap(),
        ])
        .unwrap();
    let courses = SqliteCourseRepository::try_new(conn)
        .unwrap()
        .create(vec![
            NewCourse::new("Data Structures", "Computer Science", 3).unwrap(),
            NewCourse::new("Modern Algebra", "Mathematics", 3).unwrap(),
        ])
        .unwrap();
    (students, courses)
}

#[test]
fn create_persists_dates_and_grades() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let repo = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let created = repo
        .create(vec![
            NewEnrollment::with_date(students[0].id(), courses[0].id(), 88, date(2024, 2, 1))
                .unwrap(),
            NewEnrollment::with_date(students[1].id(), courses[1].id(), 92, date(2023, 9, 15))
                .unwrap(),
        ])
        .unwrap();

    assert_eq!(created[0].id(), 1);
    assert_eq!(created[1].id(), 2);
    let loaded = repo.find_by_id(created[1].id()).unwrap().unwrap();
    assert_eq!(loaded.date, date(2023, 9, 15));
    assert_eq!(loaded.grade, 92);
    assert_eq!(loaded.student_id, students[1].id());
}

#[test]
fn dangling_reference_rolls_back_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let repo = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let err = repo
        .create(vec![
            NewEnrollment::new(students[0].id(), courses[0].id(), 80).unwrap(),
            NewEnrollment::new(students[1].id(), courses[1].id(), 70).unwrap(),
            NewEnrollment::new(999, courses[0].id(), 60).unwrap(),
        ])
        .unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.find_all().unwrap().is_empty());

    let retried = repo
        .create(vec![NewEnrollment::new(students[0].id(), courses[0].id(), 80).unwrap()])
        .unwrap();
    assert_eq!(retried.len(), 1);
}

#[test]
fn service_wraps_storage_failure_uniformly() {
    let conn = open_db_in_memory().unwrap();
    let (students, _) = seed(&conn);
    let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());

    let err = service
        .register_enrollments(vec![NewEnrollment::new(students[0].id(), 404, 75).unwrap()])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
}

#[test]
fn find_enrollment_by_student_and_course() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());
    service
        .register_enrollments(vec![
            NewEnrollment::new(students[0].id(), courses[0].id(), 88).unwrap(),
            NewEnrollment::new(students[1].id(), courses[0].id(), 92).unwrap(),
        ])
        .unwrap();

    let found = service.find_enrollment(students[1].id(), courses[0].id()).unwrap();
    assert_eq!(found.grade, 92);

    let err = service
        .find_enrollment(students[1].id(), courses[1].id())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::EnrollmentNotFound { student_id, course_id }
            if student_id == students[1].id() && course_id == courses[1].id()
    ));
}

#[test]
fn update_grade_and_course_only() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());
    let created = service
        .register_enrollments(vec![NewEnrollment::with_date(
            students[0].id(),
            courses[0].id(),
            60,
            date(2024, 1, 10),
        )
        .unwrap()])
        .unwrap();

    let updated = service
        .update_enrollment(
            created[0].id(),
            &[
                EnrollmentChange::Grade(95),
                EnrollmentChange::CourseId(courses[1].id()),
            ],
        )
        .unwrap();
    assert_eq!(updated.grade, 95);
    assert_eq!(updated.course_id, courses[1].id());
    assert_eq!(updated.student_id, students[0].id());
    assert_eq!(updated.date, date(2024, 1, 10));

    let err = service
        .update_enrollment_columns(
            created[0].id(),
            [("enrollment_date", FieldValue::Date(date(2020, 1, 1)))],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::UnknownUpdateKey { .. })
    ));
}

#[test]
fn moving_enrollment_to_missing_course_is_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());
    let created = service
        .register_enrollments(vec![NewEnrollment::new(students[0].id(), courses[0].id(), 70).unwrap()])
        .unwrap();

    let err = service
        .update_enrollment(created[0].id(), &[EnrollmentChange::CourseId(500)])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
    assert_eq!(
        service.find_enrollment_by_id(created[0].id()).unwrap().course_id,
        courses[0].id()
    );
}

#[test]
fn deleting_student_cascades_to_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    let repo = SqliteEnrollmentRepository::try_new(&conn).unwrap();
    repo.create(vec![
        NewEnrollment::new(students[0].id(), courses[0].id(), 80).unwrap(),
        NewEnrollment::new(students[1].id(), courses[0].id(), 85).unwrap(),
    ])
    .unwrap();

    SqliteStudentRepository::try_new(&conn)
        .unwrap()
        .delete(students[0].id())
        .unwrap();

    let remaining = repo.find_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].student_id, students[1].id());
}

#[test]
fn missing_and_empty_outcomes_are_typed() {
    let conn = open_db_in_memory().unwrap();
    let service = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.find_all_enrollments(),
        Err(ServiceError::NoneFound(EntityKind::Enrollment))
    ));
    assert!(matches!(
        service.find_enrollment_by_id(3),
        Err(ServiceError::NotFound {
            entity: EntityKind::Enrollment,
            id: 3
        })
    ));
    assert!(service.find_enrollments(|e| e.grade > 50).unwrap().is_empty());
    service.remove_enrollment(3).unwrap();
}

#[test]
fn corrupted_date_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let (students, courses) = seed(&conn);
    conn.execute(
        "INSERT INTO enrollment (student_id, course_id, enrollment_date, grade)
         VALUES (?1, ?2, 'not-a-date', 50);",
        [students[0].id(), courses[0].id()],
    )
    .unwrap();

    let repo = SqliteEnrollmentRepository::try_new(&conn).unwrap();
    assert!(matches!(repo.find_all(), Err(RepoError::InvalidData(_))));
}
