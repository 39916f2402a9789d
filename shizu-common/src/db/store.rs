//! Generic persistence helper
//!
//! Every named entity implements [`Entity`] on top of its [`TableSchema`]:
//! key values, column values as [`SqlValue`] and row decoding. The functions
//! below build their statements from those static descriptions and bind
//! every value, so one implementation serves all tables.
//!
//! All functions take a `&mut SqliteConnection` so callers can run them on a
//! pooled connection or inside a transaction (`&mut *tx`).

use crate::db::schema::TableSchema;
use crate::error::EntityKind;
use crate::{Error, Result};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::Row;

/// Column value tagged by storage type
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Bool(bool),
    /// Stored as a JSON array in a TEXT column
    List(Vec<String>),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<&Option<String>> for SqlValue {
    fn from(value: &Option<String>) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&Vec<String>> for SqlValue {
    fn from(value: &Vec<String>) -> Self {
        SqlValue::List(value.clone())
    }
}

/// A persisted, named record
pub trait Entity: TableSchema + Sized + Send + Unpin {
    const KIND: EntityKind;

    /// Values of `key_columns()`, in the same order
    fn key(&self) -> Vec<&str>;

    /// Every column, key columns included
    fn values(&self) -> Vec<(&'static str, SqlValue)>;

    fn from_row(row: &SqliteRow) -> Result<Self>;

    /// ORDER BY clause used by [`list`]
    fn order_by() -> &'static str {
        "name"
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_value(query: SqliteQuery<'_>, value: SqlValue) -> Result<SqliteQuery<'_>> {
    Ok(match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Integer(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::List(v) => query.bind(serde_json::to_string(&v)?),
    })
}

fn key_predicate<E: Entity>() -> String {
    E::key_columns()
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn display_key(key: &[&str]) -> String {
    key.join("/")
}

/// Decode a JSON list column; NULL or empty text decodes as an empty list
pub fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let raw: Option<String> = row.try_get(column)?;
    match raw.as_deref() {
        None | Some("") => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

pub async fn get<E: Entity>(conn: &mut SqliteConnection, key: &[&str]) -> Result<Option<E>> {
    let sql = format!("SELECT * FROM {} WHERE {}", E::table_name(), key_predicate::<E>());
    let mut query = sqlx::query(&sql);
    for value in key {
        query = query.bind(*value);
    }
    let row = query.fetch_optional(&mut *conn).await?;
    row.as_ref().map(E::from_row).transpose()
}

/// Like [`get`], but a missing row is `Error::NotFound`
pub async fn fetch<E: Entity>(conn: &mut SqliteConnection, key: &[&str]) -> Result<E> {
    get::<E>(conn, key)
        .await?
        .ok_or_else(|| Error::not_found(E::KIND, display_key(key)))
}

pub async fn exists<E: Entity>(conn: &mut SqliteConnection, key: &[&str]) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
        E::table_name(),
        key_predicate::<E>()
    );
    let mut query = sqlx::query_scalar::<_, bool>(&sql);
    for value in key {
        query = query.bind(*value);
    }
    Ok(query.fetch_one(&mut *conn).await?)
}

pub async fn list<E: Entity>(conn: &mut SqliteConnection) -> Result<Vec<E>> {
    let sql = format!("SELECT * FROM {} ORDER BY {}", E::table_name(), E::order_by());
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    rows.iter().map(E::from_row).collect()
}

pub async fn insert<E: Entity>(conn: &mut SqliteConnection, entity: &E) -> Result<()> {
    let values = entity.values();
    let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::table_name(),
        columns.join(", "),
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in values {
        query = bind_value(query, value)?;
    }

    match query.execute(&mut *conn).await {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            Error::already_exists(E::KIND, display_key(&entity.key())),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite every non-key column of the row identified by `entity.key()`
pub async fn update<E: Entity>(conn: &mut SqliteConnection, entity: &E) -> Result<()> {
    let key_columns = E::key_columns();
    let values: Vec<(&'static str, SqlValue)> = entity
        .values()
        .into_iter()
        .filter(|(c, _)| !key_columns.contains(c))
        .collect();
    if values.is_empty() {
        return Ok(());
    }

    let assignments: Vec<String> = values.iter().map(|(c, _)| format!("{} = ?", c)).collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        E::table_name(),
        assignments.join(", "),
        key_predicate::<E>()
    );

    let key = entity.key();
    let mut query = sqlx::query(&sql);
    for (_, value) in values {
        query = bind_value(query, value)?;
    }
    for value in &key {
        query = query.bind(*value);
    }

    let result = query.execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found(E::KIND, display_key(&key)));
    }
    Ok(())
}

pub async fn delete<E: Entity>(conn: &mut SqliteConnection, key: &[&str]) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE {}", E::table_name(), key_predicate::<E>());
    let mut query = sqlx::query(&sql);
    for value in key {
        query = query.bind(*value);
    }
    let result = query.execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(Error::not_found(E::KIND, display_key(key)));
    }
    Ok(())
}

/// `UPDATE <table> SET <column> = NULL WHERE <column> = ?`, returns rows touched
///
/// Used to drop references to an entity that is being deleted.
pub async fn clear_references(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    target: &str,
) -> Result<u64> {
    let sql = format!("UPDATE {} SET {} = NULL WHERE {} = ?", table, column, column);
    let result = sqlx::query(&sql).bind(target).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}
