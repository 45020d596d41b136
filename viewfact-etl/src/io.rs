//! CSV and JSON file I/O for pipeline stages

use crate::models::{CsvRecord, RawSession, RawTitle, RawUser};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use viewfact_common::{Error, Result};

pub const RAW_USERS_FILE: &str = "raw_users.csv";
pub const RAW_TITLES_FILE: &str = "raw_titles.csv";
pub const RAW_VIEWS_FILE: &str = "raw_views.csv";

pub const CLEAN_USERS_FILE: &str = "users_clean.csv";
pub const CLEAN_TITLES_FILE: &str = "titles_clean.csv";
pub const CLEAN_VIEWS_FILE: &str = "views_clean.csv";

pub const REJECTED_VIEWS_FILE: &str = "views_rejects.csv";
pub const REJECT_SUMMARY_FILE: &str = "views_reject_summary.json";

/// Read every record of a headered CSV file.
///
/// Short rows are accepted; their missing trailing columns read as absent.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Write records with a header row, even when there are no records
pub fn write_records<T: Serialize + CsvRecord>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(T::HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON document
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// The three raw collections of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub users: Vec<RawUser>,
    pub titles: Vec<RawTitle>,
    pub sessions: Vec<RawSession>,
}

pub fn read_raw_inputs(raw_dir: &Path) -> Result<RawInputs> {
    Ok(RawInputs {
        users: read_records(&raw_dir.join(RAW_USERS_FILE))?,
        titles: read_records(&raw_dir.join(RAW_TITLES_FILE))?,
        sessions: read_records(&raw_dir.join(RAW_VIEWS_FILE))?,
    })
}

pub fn write_raw_inputs(raw_dir: &Path, inputs: &RawInputs) -> Result<()> {
    write_records(&raw_dir.join(RAW_USERS_FILE), &inputs.users)?;
    write_records(&raw_dir.join(RAW_TITLES_FILE), &inputs.titles)?;
    write_records(&raw_dir.join(RAW_VIEWS_FILE), &inputs.sessions)?;
    Ok(())
}
