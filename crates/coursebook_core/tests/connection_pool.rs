use coursebook_core::db::{reset_records, ConnectionPool, DbError};
use coursebook_core::{
    DatabaseConfig, NewStudent, SqliteStudentRepository, StudentRepository, StudentService,
};
use std::thread;
use std::time::Duration;

fn pool_config(dir: &tempfile::TempDir, max_pool_size: u32, timeout_ms: u64) -> DatabaseConfig {
    DatabaseConfig {
        path: dir.path().join("coursebook.db"),
        max_pool_size,
        connect_timeout_ms: timeout_ms,
    }
}

#[test]
fn checkout_times_out_when_pool_is_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 1, 250)).unwrap();

    let held = pool.get().unwrap();
    let err = pool.get().err().unwrap();
    assert!(matches!(err, DbError::PoolTimeout { max_size: 1, .. }));

    drop(held);
    assert_eq!(pool.idle_count(), 1);
    assert!(pool.get().is_ok());
}

#[test]
fn waiting_checkout_wakes_when_connection_is_returned() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 1, 5_000)).unwrap();
    let held = pool.get().unwrap();

    let waiter = {
        let pool = pool.clone();
        thread::spawn(move || pool.get().map(|_| ()))
    };
    thread::sleep(Duration::from_millis(50));
    drop(held);

    assert!(waiter.join().unwrap().is_ok());
}

#[test]
fn pool_is_bounded_and_shares_data() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 2, 250)).unwrap();
    assert_eq!(pool.max_size(), 2);
    assert_eq!(pool.path(), dir.path().join("coursebook.db"));

    let writer = pool.get().unwrap();
    let reader = pool.get().unwrap();
    assert!(matches!(pool.get(), Err(DbError::PoolTimeout { .. })));

    let created = SqliteStudentRepository::try_new(&writer)
        .unwrap()
        .create(vec![NewStudent::new("Ann Lee", "CS", 2001, 3.8).unwrap()])
        .unwrap();

    let service = StudentService::new(SqliteStudentRepository::try_new(&reader).unwrap());
    assert_eq!(service.find_student_by_id(created[0].id()).unwrap().name, "Ann Lee");
}

#[test]
fn connection_returned_mid_transaction_is_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 1, 250)).unwrap();

    {
        let conn = pool.get().unwrap();
        conn.execute_batch("BEGIN;").unwrap();
        conn.execute(
            "INSERT INTO student (name, major, year, gpa) VALUES ('Bob Ray', 'Math', 2002, 3.2);",
            [],
        )
        .unwrap();
    }
    assert_eq!(pool.idle_count(), 1);

    let fresh = pool.get().unwrap();
    assert!(fresh.is_autocommit());
    let repo = SqliteStudentRepository::try_new(&fresh).unwrap();
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn pooled_connections_enforce_foreign_keys() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 2, 250)).unwrap();
    let _first = pool.get().unwrap();
    let second = pool.get().unwrap();

    let enabled: i64 = second
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn newer_schema_file_is_rejected_by_pool() {
    let dir = tempfile::tempdir().unwrap();
    let config = pool_config(&dir, 1, 250);
    {
        let conn = rusqlite::Connection::open(&config.path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    }

    let err = ConnectionPool::open(&config).err().unwrap();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version: 99, .. }
    ));
}

#[test]
fn reset_through_pool_clears_records_for_every_connection() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConnectionPool::open(&pool_config(&dir, 2, 250)).unwrap();

    {
        let conn = pool.get().unwrap();
        SqliteStudentRepository::try_new(&conn)
            .unwrap()
            .create(vec![
                NewStudent::new("Ann Lee", "CS", 2001, 3.8).unwrap(),
                NewStudent::new("Bob Ray", "Math", 2002, 3.2).unwrap(),
            ])
            .unwrap();
        reset_records(&conn).unwrap();
    }

    let conn = pool.get().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    assert!(repo.find_all().unwrap().is_empty());
    let created = repo
        .create(vec![NewStudent::new("Cat Ng", "CS", 2003, 3.6).unwrap()])
        .unwrap();
    assert_eq!(created[0].id(), 1);
}
