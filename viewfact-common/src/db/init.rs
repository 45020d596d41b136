//! Database initialization
//!
//! Every load starts from a fresh schema: the fact table and both dimension
//! tables are dropped and recreated, with foreign keys from `views` to
//! `users` and `titles` enforced on every pooled connection.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database and recreate the star schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Foreign keys are a per-connection pragma in SQLite, so set them on the
    // connect options rather than with a one-off query.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    recreate_schema(&pool).await?;

    Ok(pool)
}

/// Drop and recreate `users`, `titles` and `views`
pub async fn recreate_schema(pool: &SqlitePool) -> Result<()> {
    // Fact table first so the drops never trip a foreign key
    for table in ["views", "titles", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    create_users_table(pool).await?;
    create_titles_table(pool).await?;
    create_views_table(pool).await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE users (
            user_id TEXT PRIMARY KEY,
            signup_date TEXT,
            country TEXT NOT NULL,
            plan_type TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_titles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE titles (
            title_id TEXT PRIMARY KEY,
            title_name TEXT,
            content_type TEXT,
            genre TEXT NOT NULL,
            release_year INTEGER NOT NULL,
            maturity_rating TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_views_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE views (
            view_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(user_id),
            title_id TEXT NOT NULL REFERENCES titles(title_id),
            view_start TEXT NOT NULL,
            view_end TEXT NOT NULL,
            watch_minutes INTEGER NOT NULL CHECK (watch_minutes >= 0),
            completed INTEGER NOT NULL CHECK (completed IN (0, 1)),
            CHECK (view_end >= view_start)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX idx_views_user ON views(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX idx_views_title ON views(title_id)")
        .execute(pool)
        .await?;

    Ok(())
}
