//! Declarative table descriptions
//!
//! Each persisted type describes its table once. The same description drives:
//! 1. `CREATE TABLE IF NOT EXISTS` at startup
//! 2. Column sync: columns added to a description after a database was
//!    created are appended with `ALTER TABLE ADD COLUMN`
//! 3. The generic persistence helper in [`crate::db::store`]
//!
//! Changes that cannot be expressed as a column addition (type changes,
//! constraint changes) go through `migrations.rs`.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    /// SQL type (`TEXT`, `INTEGER`)
    pub sql_type: &'static str,
    pub not_null: bool,
    pub default_value: Option<&'static str>,
    /// Foreign key target, `table(column)`
    pub references: Option<&'static str>,
}

impl ColumnDefinition {
    pub fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            default_value: None,
            references: None,
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, "TEXT")
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, "INTEGER")
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn references(mut self, target: &'static str) -> Self {
        self.references = Some(target);
        self
    }

    /// Column clause as used in CREATE TABLE and ALTER TABLE
    fn clause(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some(target) = self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }
        sql
    }
}

/// Defines expected schema for a database table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Column definitions, in creation order
    fn columns() -> Vec<ColumnDefinition>;

    /// Primary key columns
    fn key_columns() -> &'static [&'static str] {
        &["name"]
    }

    fn create_table_sql() -> String {
        let mut clauses: Vec<String> = Self::columns().iter().map(|c| c.clause()).collect();
        clauses.push(format!("PRIMARY KEY ({})", Self::key_columns().join(", ")));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            clauses.join(",\n    ")
        )
    }
}

/// Reads column names from an existing table via PRAGMA table_info
pub async fn existing_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
}

pub async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Create the table if needed, then add any described column it lacks
pub async fn ensure_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table = T::table_name();

    sqlx::query(&T::create_table_sql()).execute(pool).await?;

    let actual = existing_columns(pool, table).await?;
    let missing: Vec<ColumnDefinition> = T::columns()
        .into_iter()
        .filter(|c| !actual.iter().any(|name| name == c.name))
        .collect();

    if missing.is_empty() {
        debug!("Schema up to date for '{}'", table);
        return Ok(());
    }

    for column in missing {
        add_column(pool, table, &column).await?;
    }
    Ok(())
}

async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
    // SQLite refuses NOT NULL on ADD COLUMN without a default
    let column = if column.not_null && column.default_value.is_none() {
        warn!(
            "Cannot add NOT NULL column {}.{} without DEFAULT, adding it nullable",
            table, column.name
        );
        ColumnDefinition {
            not_null: false,
            ..column.clone()
        }
    } else {
        column.clone()
    };

    let sql = format!("ALTER TABLE {} ADD COLUMN {}", table, column.clause());
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {
            info!("✓ Added column {}.{} ({})", table, column.name, column.sql_type);
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            debug!("Column {}.{} already present", table, column.name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    struct WidgetsV1;
    struct WidgetsV2;

    impl TableSchema for WidgetsV1 {
        fn table_name() -> &'static str {
            "widgets"
        }
        fn columns() -> Vec<ColumnDefinition> {
            vec![ColumnDefinition::text("name").not_null()]
        }
    }

    impl TableSchema for WidgetsV2 {
        fn table_name() -> &'static str {
            "widgets"
        }
        fn columns() -> Vec<ColumnDefinition> {
            vec![
                ColumnDefinition::text("name").not_null(),
                ColumnDefinition::integer("size").not_null().default("0"),
                ColumnDefinition::text("colour").not_null(),
            ]
        }
    }

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[test]
    fn test_create_table_sql_includes_constraints() {
        let sql = WidgetsV2::create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS widgets"));
        assert!(sql.contains("size INTEGER NOT NULL DEFAULT 0"));
        assert!(sql.contains("PRIMARY KEY (name)"));
    }

    #[test]
    fn test_references_clause() {
        let col = ColumnDefinition::text("logo").references("files(name)");
        assert_eq!(col.clause(), "logo TEXT REFERENCES files(name)");
    }

    #[tokio::test]
    async fn test_ensure_table_adds_missing_columns() {
        let pool = setup_test_db().await;

        ensure_table::<WidgetsV1>(&pool).await.unwrap();
        sqlx::query("INSERT INTO widgets (name) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap();

        ensure_table::<WidgetsV2>(&pool).await.unwrap();

        let columns = existing_columns(&pool, "widgets").await.unwrap();
        assert_eq!(columns, vec!["name", "size", "colour"]);

        let size: i64 = sqlx::query_scalar("SELECT size FROM widgets WHERE name = 'a'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(size, 0);
    }

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let pool = setup_test_db().await;
        ensure_table::<WidgetsV2>(&pool).await.unwrap();
        ensure_table::<WidgetsV2>(&pool).await.unwrap();
        assert!(table_exists(&pool, "widgets").await.unwrap());
    }
}
