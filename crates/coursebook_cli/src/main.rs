//! CLI demo entry point.
//!
//! # Responsibility
//! - Load config, reset the record tables and seed a fixed demo data set.
//! - Print the cross-entity reports over the seeded data.
//!
//! Usage: `coursebook [config.toml]`

use chrono::{Datelike, Local, NaiveDate};
use coursebook_core::db::{reset_records, ConnectionPool};
use coursebook_core::{
    init_from_config, Course, CoursebookConfig, CourseService, EnrollmentService, NewCourse,
    NewEnrollment, NewStudent, ReportService, SqliteCourseRepository, SqliteEnrollmentRepository,
    SqliteStudentRepository, Student, StudentService, ValidationResult,
};
use log::info;
use std::error::Error;
use std::fmt::Display;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("coursebook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoursebookConfig::from_file(path)?,
        None => CoursebookConfig::default(),
    };
    init_from_config(&config.logging)?;
    println!("coursebook_core version={}", coursebook_core::core_version());

    let pool = ConnectionPool::open(&config.database)?;
    let conn = pool.get()?;
    reset_records(&conn)?;

    let students = StudentService::new(SqliteStudentRepository::try_new(&conn)?);
    let courses = CourseService::new(SqliteCourseRepository::try_new(&conn)?);
    let enrollments = EnrollmentService::new(SqliteEnrollmentRepository::try_new(&conn)?);

    let registered_students = students.register_students(demo_students()?)?;
    let registered_courses = courses.register_courses(demo_courses()?)?;
    let registered_enrollments = enrollments
        .register_enrollments(demo_enrollments(&registered_students, &registered_courses)?)?;
    info!(
        "event=demo_seed module=cli status=ok students={} courses={} enrollments={}",
        registered_students.len(),
        registered_courses.len(),
        registered_enrollments.len()
    );

    let reports = ReportService::new(
        SqliteStudentRepository::try_new(&conn)?,
        SqliteCourseRepository::try_new(&conn)?,
        SqliteEnrollmentRepository::try_new(&conn)?,
    );

    print_list(
        "Students GPA > 3.5",
        &students.students_with_gpa_above(3.5)?,
    );

    let this_year = Local::now().year();
    let older = students.count_students(|student| this_year - student.year > 24)?;
    println!("Students older than 24 years old count: {older}");
    println!();

    print_list(
        "Students by gpa and department",
        &reports.students_above_gpa_in_department(3.5, "Computer Science")?,
    );

    let after = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid report date")?;
    print_list(
        "Students by course id after date",
        &reports.students_in_course_after(registered_courses[3].id(), after)?,
    );

    let averages: Vec<String> = reports
        .courses_with_average_above(85.0)?
        .into_iter()
        .map(|avg| format!("{}\nAverage Grade: {:.2}", avg.course, avg.average))
        .collect();
    print_list("Courses with average grade > 85", &averages);

    let upper: Vec<String> = students
        .find_all_students()?
        .iter()
        .map(|student| student.name.to_uppercase())
        .collect();
    print_list("Student names", &upper);

    Ok(())
}

fn print_list<T: Display>(header: &str, items: &[T]) {
    let header_line = format!("--- {header} ---");
    let divider = "-".repeat(header_line.len());

    println!("{divider}");
    println!("{header_line}");
    println!("{divider}");
    println!();
    for item in items {
        println!("{item}");
        println!();
        println!("{divider}");
        println!();
    }
}

fn demo_students() -> ValidationResult<Vec<NewStudent>> {
    [
        ("Ali Reza", "Computer Science", 2001, 3.8),
        ("Sara Jafari", "Mathematics", 2002, 3.4),
        ("Mehdi Mahdavi", "Physics", 2000, 3.0),
        ("Narges Sadeghi", "Biology", 2001, 3.2),
        ("Amir Hossein", "Chemistry", 2003, 2.8),
        ("Laleh Moradi", "Computer Science", 2000, 3.6),
        ("Reza Ghasemi", "Engineering", 1999, 3.1),
        ("Maryam Ranjbar", "History", 2002, 3.9),
        ("Kaveh Jahan", "Philosophy", 2001, 2.5),
        ("Shirin Khosravi", "Literature", 2003, 3.7),
    ]
    .into_iter()
    .map(|(name, major, year, gpa)| NewStudent::new(name, major, year, gpa))
    .collect()
}

fn demo_courses() -> ValidationResult<Vec<NewCourse>> {
    [
        ("Data Structures", "Computer Science", 3),
        ("Organic Chemistry", "Chemistry", 4),
        ("Modern Algebra", "Mathematics", 3),
        ("Quantum Mechanics", "Physics", 4),
        ("World Literature", "Literature", 2),
    ]
    .into_iter()
    .map(|(title, department, credits)| NewCourse::new(title, department, credits))
    .collect()
}

/// `(student index, course index, grade)` into the registered lists.
const DEMO_ENROLLMENTS: [(usize, usize, i64); 15] = [
    (0, 0, 88),
    (1, 0, 92),
    (2, 1, 75),
    (3, 2, 67),
    (4, 3, 81),
    (5, 0, 90),
    (6, 4, 74),
    (7, 2, 85),
    (8, 1, 70),
    (9, 3, 66),
    (0, 1, 83),
    (1, 2, 88),
    (2, 3, 79),
    (3, 4, 91),
    (4, 0, 85),
];

fn demo_enrollments(
    students: &[Student],
    courses: &[Course],
) -> ValidationResult<Vec<NewEnrollment>> {
    DEMO_ENROLLMENTS
        .iter()
        .map(|&(student, course, grade)| {
            NewEnrollment::new(students[student].id(), courses[course].id(), grade)
        })
        .collect()
}
