//! Pipeline stages over a [`DataLayout`]: generate, etl, load

use crate::dimensions::{clean_titles, clean_users};
use crate::generator::generate;
use crate::io::{
    read_raw_inputs, write_json, write_raw_inputs, write_records, CLEAN_TITLES_FILE,
    CLEAN_USERS_FILE, CLEAN_VIEWS_FILE, REJECTED_VIEWS_FILE, REJECT_SUMMARY_FILE,
};
use crate::loader::{check_clean_outputs, load_clean_data, LoadReport};
use crate::summary::ValidationSummary;
use crate::validator::validate;
use serde::Serialize;
use tracing::info;
use viewfact_common::config::{DataLayout, GeneratorConfig};
use viewfact_common::db::init_database;
use viewfact_common::Result;

/// Row counts of one ETL run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EtlReport {
    pub users_in: usize,
    pub users_out: usize,
    pub titles_in: usize,
    pub titles_out: usize,
    pub views: ValidationSummary,
}

/// Write a synthetic raw dataset into the raw directory
pub fn run_generate(layout: &DataLayout, config: &GeneratorConfig) -> Result<()> {
    config.validate()?;
    layout.ensure_directories()?;
    let inputs = generate(config);
    write_raw_inputs(&layout.raw_dir(), &inputs)?;
    info!("Saved raw CSVs to {}", layout.raw_dir().display());
    Ok(())
}

/// Clean dimensions, validate sessions, write cleaned data and rejects
pub fn run_etl(layout: &DataLayout) -> Result<EtlReport> {
    layout.ensure_directories()?;
    let inputs = read_raw_inputs(&layout.raw_dir())?;

    let users = clean_users(&inputs.users);
    let titles = clean_titles(&inputs.titles);
    let outcome = validate(&inputs.sessions);
    let summary = ValidationSummary::from_outcome(&outcome);

    let clean_dir = layout.clean_dir();
    let reject_dir = layout.reject_dir();
    write_records(&clean_dir.join(CLEAN_USERS_FILE), &users)?;
    write_records(&clean_dir.join(CLEAN_TITLES_FILE), &titles)?;
    write_records(&clean_dir.join(CLEAN_VIEWS_FILE), &outcome.clean)?;
    write_records(&reject_dir.join(REJECTED_VIEWS_FILE), &outcome.rejected)?;
    write_json(&reject_dir.join(REJECT_SUMMARY_FILE), &summary)?;

    info!("Saved cleaned data to {}", clean_dir.display());
    info!("Saved rejects to {}", reject_dir.display());
    info!("users: {} -> {}", inputs.users.len(), users.len());
    info!("titles: {} -> {}", inputs.titles.len(), titles.len());
    summary.log();

    Ok(EtlReport {
        users_in: inputs.users.len(),
        users_out: users.len(),
        titles_in: inputs.titles.len(),
        titles_out: titles.len(),
        views: summary,
    })
}

/// Recreate the database and load the cleaned CSVs into it
pub async fn run_load(layout: &DataLayout) -> Result<LoadReport> {
    // Check before touching the database so a premature load leaves it intact
    check_clean_outputs(&layout.clean_dir())?;

    let db_path = layout.database_path();
    let pool = init_database(&db_path).await?;
    let report = load_clean_data(&pool, &layout.clean_dir()).await?;
    pool.close().await;

    info!("SQLite DB ready: {}", db_path.display());
    Ok(report)
}
