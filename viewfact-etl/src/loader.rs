//! Load cleaned CSVs into SQLite
//!
//! Dimensions are inserted before the fact table so the `views` foreign
//! keys resolve. Each table is loaded in its own transaction; a failing row
//! rolls back that table and aborts the load.

use crate::io::{read_records, CLEAN_TITLES_FILE, CLEAN_USERS_FILE, CLEAN_VIEWS_FILE};
use crate::models::{CleanTitle, CleanUser, ValidatedSession};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;
use viewfact_common::{Error, Result};

/// Rows inserted per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub users: usize,
    pub titles: usize,
    pub views: usize,
}

/// Fail early with a hint when the ETL stage has not produced its outputs
pub fn check_clean_outputs(clean_dir: &Path) -> Result<()> {
    for file in [CLEAN_USERS_FILE, CLEAN_TITLES_FILE, CLEAN_VIEWS_FILE] {
        let path = clean_dir.join(file);
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "{} (missing cleaned CSVs, run the etl stage first)",
                path.display()
            )));
        }
    }
    Ok(())
}

pub async fn insert_users(pool: &SqlitePool, users: &[CleanUser]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    for user in users {
        sqlx::query(
            "INSERT INTO users (user_id, signup_date, country, plan_type) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.user_id)
        .bind(&user.signup_date)
        .bind(&user.country)
        .bind(&user.plan_type)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Loaded {} rows into users", users.len());
    Ok(users.len())
}

pub async fn insert_titles(pool: &SqlitePool, titles: &[CleanTitle]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    for title in titles {
        sqlx::query(
            r#"
            INSERT INTO titles (title_id, title_name, content_type, genre, release_year, maturity_rating)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&title.title_id)
        .bind(&title.title_name)
        .bind(&title.content_type)
        .bind(&title.genre)
        .bind(title.release_year)
        .bind(&title.maturity_rating)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Loaded {} rows into titles", titles.len());
    Ok(titles.len())
}

pub async fn insert_views(pool: &SqlitePool, views: &[ValidatedSession]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    for view in views {
        sqlx::query(
            r#"
            INSERT INTO views (view_id, user_id, title_id, view_start, view_end, watch_minutes, completed)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&view.view_id)
        .bind(&view.user_id)
        .bind(&view.title_id)
        .bind(&view.view_start)
        .bind(&view.view_end)
        .bind(view.watch_minutes)
        .bind(i64::from(view.completed))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Loaded {} rows into views", views.len());
    Ok(views.len())
}

/// Read the three cleaned CSVs and insert them, dimensions first
pub async fn load_clean_data(pool: &SqlitePool, clean_dir: &Path) -> Result<LoadReport> {
    check_clean_outputs(clean_dir)?;

    let users: Vec<CleanUser> = read_records(&clean_dir.join(CLEAN_USERS_FILE))?;
    let titles: Vec<CleanTitle> = read_records(&clean_dir.join(CLEAN_TITLES_FILE))?;
    let views: Vec<ValidatedSession> = read_records(&clean_dir.join(CLEAN_VIEWS_FILE))?;

    Ok(LoadReport {
        users: insert_users(pool, &users).await?,
        titles: insert_titles(pool, &titles).await?,
        views: insert_views(pool, &views).await?,
    })
}
