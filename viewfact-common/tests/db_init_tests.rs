//! Tests for database initialization

use viewfact_common::db::init::init_database;

async fn table_names(pool: &sqlx::SqlitePool) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("viewfact.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    let pool = result.unwrap();
    assert_eq!(table_names(&pool).await, vec!["titles", "users", "views"]);
}

#[tokio::test]
async fn test_reinit_drops_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("viewfact.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO users (user_id, signup_date, country, plan_type) VALUES ('U1', NULL, 'AU', 'Basic')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("viewfact.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO views (view_id, user_id, title_id, view_start, view_end, watch_minutes, completed) \
         VALUES ('V1', 'U404', 'T404', '2026-01-01 00:00:00', '2026-01-01 00:10:00', 10, 0)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Orphan fact row should violate foreign key");
}

#[tokio::test]
async fn test_views_check_constraints() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("viewfact.db")).await.unwrap();

    sqlx::query("INSERT INTO users (user_id, signup_date, country, plan_type) VALUES ('U1', NULL, 'AU', 'Basic')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO titles (title_id, title_name, content_type, genre, release_year, maturity_rating) \
         VALUES ('T1', 'Title 1', 'Movie', 'Drama', 2020, 'G')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let negative = sqlx::query(
        "INSERT INTO views VALUES ('V1', 'U1', 'T1', '2026-01-01 00:00:00', '2026-01-01 00:10:00', -1, 0)",
    )
    .execute(&pool)
    .await;
    assert!(negative.is_err());

    let inverted = sqlx::query(
        "INSERT INTO views VALUES ('V2', 'U1', 'T1', '2026-01-01 01:00:00', '2026-01-01 00:10:00', 5, 0)",
    )
    .execute(&pool)
    .await;
    assert!(inverted.is_err());

    let ok = sqlx::query(
        "INSERT INTO views VALUES ('V3', 'U1', 'T1', '2026-01-01 00:00:00', '2026-01-01 00:00:00', 0, 1)",
    )
    .execute(&pool)
    .await;
    assert!(ok.is_ok());
}
