//! Schema bootstrap against databases written by older releases

use shizu_common::db::migrations::get_schema_version;
use shizu_common::db::schema::existing_columns;
use shizu_common::db::{init_database, store, Theme};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

#[tokio::test]
async fn test_old_themes_table_gains_missing_columns() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("shizu.db");

    {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        sqlx::query(
            "CREATE TABLE themes (name TEXT NOT NULL PRIMARY KEY, overlay_file TEXT, chat_width INTEGER)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO themes (name, chat_width) VALUES ('neon', 320)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();

    let columns = existing_columns(&pool, "themes").await.unwrap();
    assert!(columns.contains(&"starting_bgm_file".to_string()));
    assert!(columns.contains(&"target_video_width".to_string()));

    let mut conn = pool.acquire().await.unwrap();
    let theme: Theme = store::fetch(&mut conn, &["neon"]).await.unwrap();
    assert_eq!(theme.chat_width, Some(320));
    assert_eq!(theme.starting_bgm_file, None);
    drop(conn);

    assert!(get_schema_version(&pool).await.unwrap() >= 1);
}
