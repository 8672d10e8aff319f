use coursebook_core::db::open_db_in_memory;
use coursebook_core::{
    CourseChange, CourseRepository, CourseService, EntityKind, FieldValue, NewCourse, RepoError,
    ServiceError, SqliteCourseRepository, ValidationError,
};

fn sample_courses() -> Vec<NewCourse> {
    vec![
        NewCourse::new("Data Structures", "Computer Science", 3).unwrap(),
        NewCourse::new("Organic Chemistry", "Chemistry", 4).unwrap(),
    ]
}

#[test]
fn register_and_find_courses() {
    let conn = open_db_in_memory().unwrap();
    let service = CourseService::new(SqliteCourseRepository::try_new(&conn).unwrap());

    let created = service.register_courses(sample_courses()).unwrap();
    assert_eq!(created[0].id(), 1);
    assert_eq!(created[1].id(), 2);
    assert_eq!(created[1].title, "Organic Chemistry");

    let all = service.find_all_courses().unwrap();
    assert_eq!(all, created);
    assert_eq!(service.find_course_by_id(2).unwrap().credits, 4);
}

#[test]
fn draft_rejects_credit_and_text_violations() {
    assert!(matches!(
        NewCourse::new("Thesis", "History", 7),
        Err(ValidationError::OutOfRange {
            field: "credits",
            ..
        })
    ));
    assert!(NewCourse::new("Thesis", "History", 0).is_err());
    assert!(matches!(
        NewCourse::new("", "History", 3),
        Err(ValidationError::EmptyText { field: "title" })
    ));
}

#[test]
fn update_title_keeps_other_columns() {
    let conn = open_db_in_memory().unwrap();
    let service = CourseService::new(SqliteCourseRepository::try_new(&conn).unwrap());
    let created = service.register_courses(sample_courses()).unwrap();

    let updated = service
        .update_course(
            created[0].id(),
            &[CourseChange::Title("Advanced Data Structures".to_string())],
        )
        .unwrap();
    assert_eq!(updated.title, "Advanced Data Structures");
    assert_eq!(updated.department, "Computer Science");
    assert_eq!(updated.credits, 3);
}

#[test]
fn update_rejects_wrong_value_kind_and_out_of_range_credits() {
    let conn = open_db_in_memory().unwrap();
    let service = CourseService::new(SqliteCourseRepository::try_new(&conn).unwrap());
    let created = service.register_courses(sample_courses()).unwrap();

    let kind_err = service
        .update_course_columns(created[0].id(), [("credits", FieldValue::from("four"))])
        .unwrap_err();
    assert!(matches!(
        kind_err,
        ServiceError::Validation(ValidationError::TypeMismatch {
            field: "credits",
            expected: "integer",
            actual: "text",
        })
    ));

    let range_err = service
        .update_course(created[0].id(), &[CourseChange::Credits(9)])
        .unwrap_err();
    assert!(matches!(range_err, ServiceError::Validation(_)));
    assert_eq!(service.find_course_by_id(created[0].id()).unwrap().credits, 3);
}

#[test]
fn update_missing_course_is_typed_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CourseService::new(SqliteCourseRepository::try_new(&conn).unwrap());

    let err = service
        .update_course(11, &[CourseChange::Credits(2)])
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Course,
            id: 11
        }
    ));
}

#[test]
fn remove_course_is_idempotent_and_empty_table_is_none_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    let created = repo.create(sample_courses()).unwrap();
    let service = CourseService::new(repo);

    for course in &created {
        service.remove_course(course.id()).unwrap();
        service.remove_course(course.id()).unwrap();
    }

    assert!(repo.find_all().unwrap().is_empty());
    assert!(matches!(
        service.find_all_courses(),
        Err(ServiceError::NoneFound(EntityKind::Course))
    ));
}

#[test]
fn schema_check_backs_up_credit_range() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    repo.create(sample_courses()).unwrap();

    let err = conn
        .execute("UPDATE course SET credits = 12 WHERE id = 1;", [])
        .unwrap_err();
    let wrapped: RepoError = err.into();
    assert!(matches!(wrapped, RepoError::Db(_)));
}
