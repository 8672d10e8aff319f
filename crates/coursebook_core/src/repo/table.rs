//! Generic table access shared by the entity repositories.
//!
//! # Responsibility
//! - Describe how one entity maps onto one table (`TableRecord`).
//! - Implement batch insert, lookup, partial update and delete once, for every
//!   entity.
//!
//! # Invariants
//! - Batch insert is all-or-nothing: records are produced only after commit.
//! - Generated ids are returned in the same order as the input drafts.
//! - UPDATE statements cover exactly the supplied columns plus the id predicate.
//! - Column names in generated SQL come from static allow-lists only.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::change::{check_change_set, ColumnChange, FieldValue};
use crate::model::validation::{validate_non_empty, ValidationResult};
use crate::model::{EntityKind, RecordId};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Params, Row};
use std::time::Instant;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Mapping between one entity and its table.
pub(crate) trait TableRecord: Sized {
    /// Unpersisted value accepted by batch insert.
    type Draft;
    /// Allowed partial updates.
    type Change: ColumnChange;

    const KIND: EntityKind;
    /// Columns written on insert, in `insert_values` order.
    const INSERT_COLUMNS: &'static [&'static str];
    /// Columns read by `from_row`, including `id`.
    const SELECT_COLUMNS: &'static [&'static str];

    fn validate_draft(draft: &Self::Draft) -> ValidationResult<()>;
    fn insert_values(draft: &Self::Draft) -> Vec<Value>;
    fn into_record(draft: Self::Draft, id: RecordId) -> Self;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Rejects connections that were not migrated to the current schema.
pub(crate) fn ensure_table_ready<R: TableRecord>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table = R::KIND.table();
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}

/// Inserts all drafts in one transaction and returns the persisted records.
///
/// # Errors
/// - `Validation` for an empty batch or any invalid draft; nothing is written.
/// - `Db` when any row is rejected; the transaction rolls back and no record is
///   returned.
pub(crate) fn insert_batch<R: TableRecord>(
    conn: &Connection,
    drafts: Vec<R::Draft>,
) -> RepoResult<Vec<R>> {
    validate_non_empty(R::KIND.table(), &drafts)?;
    for draft in &drafts {
        R::validate_draft(draft)?;
    }

    let started_at = Instant::now();
    let ids = match insert_rows::<R>(conn, &drafts) {
        Ok(ids) => ids,
        Err(err) => {
            error!(
                "event=batch_create module=repo status=error table={} rows={} duration_ms={} error={}",
                R::KIND.table(),
                drafts.len(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    info!(
        "event=batch_create module=repo status=ok table={} rows={} duration_ms={}",
        R::KIND.table(),
        ids.len(),
        started_at.elapsed().as_millis()
    );

    Ok(drafts
        .into_iter()
        .zip(ids)
        .map(|(draft, id)| R::into_record(draft, id))
        .collect())
}

fn insert_rows<R: TableRecord>(conn: &Connection, drafts: &[R::Draft]) -> RepoResult<Vec<RecordId>> {
    let sql = insert_sql(R::KIND.table(), R::INSERT_COLUMNS);
    // Dropping `tx` without commit rolls back every row inserted so far.
    let tx = conn.unchecked_transaction()?;
    let mut ids = Vec::with_capacity(drafts.len());
    {
        let mut stmt = tx.prepare(&sql)?;
        for draft in drafts {
            ids.push(stmt.insert(params_from_iter(R::insert_values(draft)))?);
        }
    }
    tx.commit()?;
    Ok(ids)
}

pub(crate) fn select_by_id<R: TableRecord>(conn: &Connection, id: RecordId) -> RepoResult<Option<R>> {
    let mut records = select_where::<R, _>(conn, "id = ?1", [id])?;
    Ok(records.pop())
}

pub(crate) fn select_all<R: TableRecord>(conn: &Connection) -> RepoResult<Vec<R>> {
    select_where::<R, _>(conn, "1 = 1", [])
}

/// Runs `SELECT <columns> FROM <table> WHERE <predicate> ORDER BY id`.
pub(crate) fn select_where<R: TableRecord, P: Params>(
    conn: &Connection,
    predicate: &str,
    params: P,
) -> RepoResult<Vec<R>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {predicate} ORDER BY id ASC;",
        R::SELECT_COLUMNS.join(", "),
        R::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(R::from_row(row)?);
    }
    Ok(records)
}

/// Applies a partial update covering exactly the columns in `changes`.
///
/// # Errors
/// - `Validation` for an empty, duplicated or invalid change set, before any
///   SQL runs.
/// - `NotFound` when no row has `id`.
pub(crate) fn update_columns<R: TableRecord>(
    conn: &Connection,
    id: RecordId,
    changes: &[R::Change],
) -> RepoResult<()> {
    check_change_set(changes)?;

    let columns: Vec<&'static str> = changes.iter().map(|change| change.column()).collect();
    let sql = update_sql(R::KIND.table(), &columns);
    let mut values: Vec<Value> = changes
        .iter()
        .map(|change| field_value_to_sql(change.value()))
        .collect();
    values.push(Value::Integer(id));

    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: R::KIND,
            id,
        });
    }

    debug!(
        "event=update module=repo status=ok table={} id={} columns={}",
        R::KIND.table(),
        id,
        columns.len()
    );
    Ok(())
}

/// Deletes one row; returns how many rows matched (0 or 1).
pub(crate) fn delete_by_id<R: TableRecord>(conn: &Connection, id: RecordId) -> RepoResult<usize> {
    let sql = format!("DELETE FROM {} WHERE id = ?1;", R::KIND.table());
    let changed = conn.execute(&sql, [id])?;
    debug!(
        "event=delete module=repo status=ok table={} id={} changed={}",
        R::KIND.table(),
        id,
        changed
    );
    Ok(changed)
}

/// `INSERT INTO t (a, b) VALUES (?1, ?2);`
pub(crate) fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders});",
        columns.join(", ")
    )
}

/// `UPDATE t SET a = ?1, b = ?2 WHERE id = ?3;`
pub(crate) fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} SET {assignments} WHERE id = ?{};",
        columns.len() + 1
    )
}

pub(crate) fn field_value_to_sql(value: FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => Value::Text(text),
        FieldValue::Integer(number) => Value::Integer(number),
        FieldValue::Real(number) => Value::Real(number),
        FieldValue::Date(date) => Value::Text(format_date(date)),
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{value}` in {column}"))
    })
}
