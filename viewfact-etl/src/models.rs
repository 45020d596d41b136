//! Record types for raw input, cleaned output and rejects
//!
//! Raw records keep every non-identifier field as optional text so that a
//! malformed value survives CSV decoding and reaches the cleaning logic.

use serde::{Deserialize, Serialize};

/// Column order of a record type when written as CSV.
///
/// Must list the struct's fields in declaration order.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];
}

/// One raw viewing session as exported by the source system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSession {
    pub view_id: String,
    pub user_id: String,
    pub title_id: String,
    #[serde(default)]
    pub view_start: Option<String>,
    #[serde(default)]
    pub view_end: Option<String>,
    #[serde(default)]
    pub watch_minutes: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
}

impl CsvRecord for RawSession {
    const HEADERS: &'static [&'static str] = &[
        "view_id",
        "user_id",
        "title_id",
        "view_start",
        "view_end",
        "watch_minutes",
        "completed",
    ];
}

/// A session that passed repair and classification.
///
/// `view_end >= view_start` and `watch_minutes >= 0` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSession {
    pub view_id: String,
    pub user_id: String,
    pub title_id: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub view_start: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub view_end: String,
    pub watch_minutes: i64,
    /// 0 or 1
    pub completed: u8,
}

impl CsvRecord for ValidatedSession {
    const HEADERS: &'static [&'static str] = &[
        "view_id",
        "user_id",
        "title_id",
        "view_start",
        "view_end",
        "watch_minutes",
        "completed",
    ];
}

/// A session that could not be repaired, carrying its post-repair values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedSession {
    pub view_id: String,
    pub user_id: String,
    pub title_id: String,
    /// Canonical text of the repaired start, empty when unparseable
    pub view_start: Option<String>,
    /// Canonical text of the repaired end, empty when unparseable
    pub view_end: Option<String>,
    pub watch_minutes: Option<f64>,
    /// Raw flag text, not coerced
    pub completed: Option<String>,
    /// Comma-joined reason codes, never empty
    pub reject_reason: String,
}

impl CsvRecord for RejectedSession {
    const HEADERS: &'static [&'static str] = &[
        "view_id",
        "user_id",
        "title_id",
        "view_start",
        "view_end",
        "watch_minutes",
        "completed",
        "reject_reason",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub user_id: String,
    #[serde(default)]
    pub signup_date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
}

impl CsvRecord for RawUser {
    const HEADERS: &'static [&'static str] = &["user_id", "signup_date", "country", "plan_type"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanUser {
    pub user_id: String,
    /// `YYYY-MM-DD`, empty when the raw date did not parse
    pub signup_date: Option<String>,
    pub country: String,
    pub plan_type: String,
}

impl CsvRecord for CleanUser {
    const HEADERS: &'static [&'static str] = &["user_id", "signup_date", "country", "plan_type"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTitle {
    pub title_id: String,
    #[serde(default)]
    pub title_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<String>,
    #[serde(default)]
    pub maturity_rating: Option<String>,
}

impl CsvRecord for RawTitle {
    const HEADERS: &'static [&'static str] = &[
        "title_id",
        "title_name",
        "content_type",
        "genre",
        "release_year",
        "maturity_rating",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanTitle {
    pub title_id: String,
    pub title_name: Option<String>,
    pub content_type: Option<String>,
    pub genre: String,
    pub release_year: i64,
    pub maturity_rating: String,
}

impl CsvRecord for CleanTitle {
    const HEADERS: &'static [&'static str] = &[
        "title_id",
        "title_name",
        "content_type",
        "genre",
        "release_year",
        "maturity_rating",
    ];
}
