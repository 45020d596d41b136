//! End-to-end tests of the generate, etl and load stages

use tempfile::TempDir;
use viewfact_common::config::{DataLayout, GeneratorConfig};
use viewfact_common::db::init_database;
use viewfact_common::Error;
use viewfact_etl::io::{
    read_records, write_records, CLEAN_VIEWS_FILE, RAW_USERS_FILE, RAW_VIEWS_FILE,
    REJECTED_VIEWS_FILE, REJECT_SUMMARY_FILE,
};
use viewfact_etl::loader::{insert_titles, insert_users, insert_views};
use viewfact_etl::models::{CleanTitle, CleanUser, RawUser};
use viewfact_etl::pipeline::{run_etl, run_generate, run_load};
use viewfact_etl::{RawSession, RejectedSession, ValidatedSession, ValidationSummary};

fn small_config() -> GeneratorConfig {
    GeneratorConfig {
        seed: 42,
        users: 25,
        titles: 15,
        views: 400,
        corruption_rate: 0.1,
    }
}

fn layout() -> (TempDir, DataLayout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path().join("root"));
    (dir, layout)
}

#[test]
fn test_generate_then_etl_partitions_every_view() {
    let (_dir, layout) = layout();
    run_generate(&layout, &small_config()).unwrap();

    let raw: Vec<RawSession> = read_records(&layout.raw_dir().join(RAW_VIEWS_FILE)).unwrap();
    assert_eq!(raw.len(), 400);

    let report = run_etl(&layout).unwrap();
    assert_eq!(report.users_in, 25);
    assert_eq!(report.users_out, 25);
    assert_eq!(report.titles_out, 15);
    assert_eq!(report.views.total, 400);

    let clean: Vec<ValidatedSession> =
        read_records(&layout.clean_dir().join(CLEAN_VIEWS_FILE)).unwrap();
    let rejected: Vec<RejectedSession> =
        read_records(&layout.reject_dir().join(REJECTED_VIEWS_FILE)).unwrap();

    assert_eq!(clean.len(), report.views.clean);
    assert_eq!(rejected.len(), report.views.rejected);
    assert_eq!(clean.len() + rejected.len(), raw.len());
    assert!(rejected.iter().all(|r| !r.reject_reason.is_empty()));

    let summary_text =
        std::fs::read_to_string(layout.reject_dir().join(REJECT_SUMMARY_FILE)).unwrap();
    let summary: ValidationSummary = serde_json::from_str(&summary_text).unwrap();
    assert_eq!(summary, report.views);
}

#[test]
fn test_generate_rejects_bad_corruption_rate() {
    let (_dir, layout) = layout();
    let config = GeneratorConfig {
        corruption_rate: 2.0,
        ..small_config()
    };

    let result = run_generate(&layout, &config);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!layout.raw_dir().join(RAW_VIEWS_FILE).exists());
}

#[test]
fn test_etl_without_raw_data_fails() {
    let (_dir, layout) = layout();
    let result = run_etl(&layout);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_etl_tolerates_missing_completed_column() {
    let (_dir, layout) = layout();
    run_generate(&layout, &small_config()).unwrap();

    let raw_dir = layout.raw_dir();
    std::fs::write(
        raw_dir.join(RAW_VIEWS_FILE),
        "view_id,user_id,title_id,view_start,view_end,watch_minutes\n\
         V1,U0001,T0001,2026-01-01 00:00:00,2026-01-01 01:30:00,-5\n\
         V2,U0001,T0001,,2026-01-01 01:30:00,30\n",
    )
    .unwrap();

    let report = run_etl(&layout).unwrap();
    assert_eq!(report.views.clean, 1);
    assert_eq!(report.views.rejected, 1);

    let clean: Vec<ValidatedSession> =
        read_records(&layout.clean_dir().join(CLEAN_VIEWS_FILE)).unwrap();
    assert_eq!(clean[0].watch_minutes, 90);
    assert_eq!(clean[0].completed, 0);
}

#[test]
fn test_etl_rejects_truncated_row_without_failing() {
    let (_dir, layout) = layout();
    run_generate(&layout, &small_config()).unwrap();

    std::fs::write(
        layout.raw_dir().join(RAW_VIEWS_FILE),
        "view_id,user_id,title_id,view_start,view_end,watch_minutes,completed\n\
         V1,U0001,T0001,2026-01-01 00:00:00,2026-01-01 00:30:00,30,0\n\
         V2,U0001,T0001,2026-01-01 00:00:00\n\
         V3,U0001,T0001,2026-01-01 01:00:00,2026-01-01 01:45:00,45,1\n",
    )
    .unwrap();

    let report = run_etl(&layout).unwrap();
    assert_eq!(report.views.total, 3);
    assert_eq!(report.views.clean, 2);

    let rejected: Vec<RejectedSession> =
        read_records(&layout.reject_dir().join(REJECTED_VIEWS_FILE)).unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].view_id, "V2");
    assert_eq!(rejected[0].reject_reason, "bad_timestamp,bad_watch_minutes");
}

#[test]
fn test_etl_cleans_sparse_users() {
    let (_dir, layout) = layout();
    run_generate(&layout, &small_config()).unwrap();

    let users = vec![RawUser {
        user_id: "U0001".to_string(),
        signup_date: None,
        country: None,
        plan_type: Some("Premium".to_string()),
    }];
    write_records(&layout.raw_dir().join(RAW_USERS_FILE), &users).unwrap();

    let report = run_etl(&layout).unwrap();
    assert_eq!(report.users_out, 1);
}

#[tokio::test]
async fn test_full_run_loads_database() {
    let (_dir, layout) = layout();
    run_generate(&layout, &small_config()).unwrap();
    let etl = run_etl(&layout).unwrap();

    let report = run_load(&layout).await.unwrap();
    assert_eq!(report.users, 25);
    assert_eq!(report.titles, 15);
    assert_eq!(report.views, etl.views.clean);
    assert!(layout.database_path().exists());
}

#[tokio::test]
async fn test_load_before_etl_is_not_found() {
    let (_dir, layout) = layout();
    let result = run_load(&layout).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(!layout.database_path().exists());
}

#[tokio::test]
async fn test_loader_rejects_orphan_views() {
    let (dir, _layout) = layout();
    let pool = init_database(&dir.path().join("viewfact.db")).await.unwrap();

    insert_users(
        &pool,
        &[CleanUser {
            user_id: "U0001".to_string(),
            signup_date: Some("2025-01-01".to_string()),
            country: "AU".to_string(),
            plan_type: "Basic".to_string(),
        }],
    )
    .await
    .unwrap();
    insert_titles(
        &pool,
        &[CleanTitle {
            title_id: "T0001".to_string(),
            title_name: Some("Title 1".to_string()),
            content_type: Some("Movie".to_string()),
            genre: "Drama".to_string(),
            release_year: 2001,
            maturity_rating: "G".to_string(),
        }],
    )
    .await
    .unwrap();

    let orphan = ValidatedSession {
        view_id: "V1".to_string(),
        user_id: "U9999".to_string(),
        title_id: "T0001".to_string(),
        view_start: "2026-01-01 00:00:00".to_string(),
        view_end: "2026-01-01 00:10:00".to_string(),
        watch_minutes: 10,
        completed: 0,
    };
    let result = insert_views(&pool, &[orphan]).await;
    assert!(matches!(result, Err(Error::Database(_))));

    // Transaction rolled back
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM views")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
