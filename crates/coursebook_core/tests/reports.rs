use chrono::NaiveDate;
use coursebook_core::db::open_db_in_memory;
use coursebook_core::{
    CourseRepository, EnrollmentRepository, NewCourse, NewEnrollment, NewStudent, ReportService,
    ServiceError, SqliteCourseRepository, SqliteEnrollmentRepository, SqliteStudentRepository,
    StudentRepository, ValidationError,
};
use rusqlite::Connection;

type Reports<'conn> = ReportService<
    SqliteStudentRepository<'conn>,
    SqliteCourseRepository<'conn>,
    SqliteEnrollmentRepository<'conn>,
>;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn reports(conn: &Connection) -> Reports<'_> {
    ReportService::new(
        SqliteStudentRepository::try_new(conn).unwrap(),
        SqliteCourseRepository::try_new(conn).unwrap(),
        SqliteEnrollmentRepository::try_new(conn).unwrap(),
    )
}

/// Students 1..=4, courses 1..=3 (two in Computer Science), five enrollments.
fn seed(conn: &Connection) {
    SqliteStudentRepository::try_new(conn)
        .unwrap()
        .create(vec![
            NewStudent::new("Ann Lee", "CS", 2001, 3.8).unwrap(),
            NewStudent::new("Bob Ray", "Math", 2002, 3.1).unwrap(),
            NewStudent::new("Cat Ng", "CS", 2003, 3.6).unwrap(),
            NewStudent::new("Dan Wu", "Physics", 2001, 2.9).unwrap(),
        ])
        .unwrap();
    SqliteCourseRepository::try_new(conn)
        .unwrap()
        .create(vec![
            NewCourse::new("Data Structures", "Computer Science", 3).unwrap(),
            NewCourse::new("Modern Algebra", "Mathematics", 3).unwrap(),
            NewCourse::new("Operating Systems", "Computer Science", 4).unwrap(),
        ])
        .unwrap();
    SqliteEnrollmentRepository::try_new(conn)
        .unwrap()
        .create(vec![
            NewEnrollment::with_date(3, 3, 91, date(2024, 2, 1)).unwrap(),
            NewEnrollment::with_date(1, 1, 88, date(2023, 9, 1)).unwrap(),
            NewEnrollment::with_date(2, 2, 70, date(2023, 9, 1)).unwrap(),
            NewEnrollment::with_date(1, 3, 95, date(2024, 2, 1)).unwrap(),
            NewEnrollment::with_date(4, 1, 62, date(2024, 1, 15)).unwrap(),
        ])
        .unwrap();
}

#[test]
fn department_ids_are_distinct_in_enrollment_order() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let ids = reports(&conn)
        .student_ids_by_department("Computer Science")
        .unwrap();
    assert_eq!(ids, vec![3, 1, 4]);

    assert!(reports(&conn)
        .student_ids_by_department("Philosophy")
        .unwrap()
        .is_empty());
}

#[test]
fn blank_department_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = reports(&conn).student_ids_by_department("  ").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyText { .. })
    ));
}

#[test]
fn course_after_date_is_strict() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let reports = reports(&conn);

    let after_new_year = reports
        .students_in_course_after(1, date(2024, 1, 1))
        .unwrap();
    let names: Vec<_> = after_new_year.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Dan Wu"]);

    let on_boundary = reports
        .students_in_course_after(1, date(2024, 1, 15))
        .unwrap();
    assert!(on_boundary.is_empty());
}

#[test]
fn students_by_enrollment_returns_each_student_once() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let high_graders = reports(&conn)
        .students_by_enrollment(|enrollment| enrollment.grade >= 85)
        .unwrap();
    let ids: Vec<_> = high_graders.iter().map(|s| s.id()).collect();
    assert_eq!(ids, [1, 3]);
}

#[test]
fn gpa_and_department_filters_combine() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let students = reports(&conn)
        .students_above_gpa_in_department(3.5, "Computer Science")
        .unwrap();
    let ids: Vec<_> = students.iter().map(|s| s.id()).collect();
    assert_eq!(ids, [1, 3]);

    let none = reports(&conn)
        .students_above_gpa_in_department(3.8, "Computer Science")
        .unwrap();
    assert!(none.is_empty());

    assert!(reports(&conn)
        .students_above_gpa_in_department(4.5, "Computer Science")
        .is_err());
}

#[test]
fn course_averages_group_by_course() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let averages = reports(&conn).courses_with_average_above(80.0).unwrap();
    let rows: Vec<_> = averages
        .iter()
        .map(|avg| (avg.course.id(), avg.average, avg.enrollments))
        .collect();
    assert_eq!(rows, [(3, 93.0, 2)]);

    let all = reports(&conn).courses_with_average_above(0.0).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].average, 75.0);
}

#[test]
fn courses_without_enrollments_have_no_average() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    SqliteCourseRepository::try_new(&conn)
        .unwrap()
        .create(vec![NewCourse::new("Compilers", "Computer Science", 4).unwrap()])
        .unwrap();

    let averages = reports(&conn).courses_with_average_above(-1.0).unwrap();
    assert!(averages.iter().all(|avg| avg.course.title != "Compilers"));
    assert!(reports(&conn).courses_with_average_above(f64::NAN).is_err());
}

#[test]
fn reports_over_empty_tables_are_empty() {
    let conn = open_db_in_memory().unwrap();
    let reports = reports(&conn);

    assert!(reports.student_ids_by_department("Mathematics").unwrap().is_empty());
    assert!(reports.courses_with_average_above(50.0).unwrap().is_empty());
    assert!(reports
        .students_in_course_after(1, date(2020, 1, 1))
        .unwrap()
        .is_empty());
    assert!(SqliteEnrollmentRepository::try_new(&conn)
        .unwrap()
        .find_all()
        .unwrap()
        .is_empty());
}
