//! User and title dimension cleaning
//!
//! Dimension cleaning never rejects a row: missing values are filled with a
//! sentinel and controlled-vocabulary fields are mapped onto canonical
//! tokens, falling back to [`OTHER`].

use crate::models::{CleanTitle, CleanUser, RawTitle, RawUser};
use crate::validator::parse_number;
use viewfact_common::time::{format_date, parse_date};

/// Sentinel for missing country / plan values
pub const UNKNOWN: &str = "UNKNOWN";

/// Canonical token for unmapped genres and ratings
pub const OTHER: &str = "Other";

/// Map a raw genre token to its canonical form
pub fn normalize_genre(raw: &str) -> &'static str {
    match raw.trim() {
        "SciFi" | "Sci-Fi" | "Science Fiction" => "Sci-Fi",
        "Docu" | "Documentary" => "Documentary",
        "Drama" => "Drama",
        "Comedy" => "Comedy",
        "Thriller" => "Thriller",
        _ => OTHER,
    }
}

/// Map a raw maturity rating token to its canonical form
pub fn normalize_rating(raw: &str) -> &'static str {
    match raw.trim() {
        "PG13" | "pg-13" | "PG-13" => "PG-13",
        "TVMA" | "TV-MA" => "TV-MA",
        "G" => "G",
        "R" => "R",
        _ => OTHER,
    }
}

fn fill_missing(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

pub fn clean_user(raw: &RawUser) -> CleanUser {
    CleanUser {
        user_id: raw.user_id.clone(),
        signup_date: raw
            .signup_date
            .as_deref()
            .and_then(parse_date)
            .map(|d| format_date(&d)),
        country: fill_missing(raw.country.as_deref()),
        plan_type: fill_missing(raw.plan_type.as_deref()),
    }
}

pub fn clean_users(raw: &[RawUser]) -> Vec<CleanUser> {
    raw.iter().map(clean_user).collect()
}

pub fn clean_title(raw: &RawTitle) -> CleanTitle {
    CleanTitle {
        title_id: raw.title_id.clone(),
        title_name: raw.title_name.clone(),
        content_type: raw.content_type.clone(),
        genre: normalize_genre(raw.genre.as_deref().unwrap_or_default()).to_string(),
        // "2020.0" style floats come out of some exporters
        release_year: parse_number(raw.release_year.as_deref())
            .map(|y| y.trunc() as i64)
            .unwrap_or(0),
        maturity_rating: normalize_rating(raw.maturity_rating.as_deref().unwrap_or_default())
            .to_string(),
    }
}

pub fn clean_titles(raw: &[RawTitle]) -> Vec<CleanTitle> {
    raw.iter().map(clean_title).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_variants() {
        assert_eq!(normalize_genre("SciFi"), "Sci-Fi");
        assert_eq!(normalize_genre("Science Fiction"), "Sci-Fi");
        assert_eq!(normalize_genre(" Sci-Fi "), "Sci-Fi");
        assert_eq!(normalize_genre("Docu"), "Documentary");
        assert_eq!(normalize_genre("Drama"), "Drama");
        assert_eq!(normalize_genre("Horror"), OTHER);
        assert_eq!(normalize_genre("drama"), OTHER);
        assert_eq!(normalize_genre(""), OTHER);
    }

    #[test]
    fn test_rating_variants() {
        assert_eq!(normalize_rating("PG13"), "PG-13");
        assert_eq!(normalize_rating("pg-13"), "PG-13");
        assert_eq!(normalize_rating("TVMA"), "TV-MA");
        assert_eq!(normalize_rating("R"), "R");
        assert_eq!(normalize_rating("NC-17"), OTHER);
    }

    #[test]
    fn test_clean_user_fills_sentinels() {
        let user = clean_user(&RawUser {
            user_id: "U0001".to_string(),
            signup_date: Some("2025-03-04".to_string()),
            country: None,
            plan_type: Some("  ".to_string()),
        });
        assert_eq!(user.signup_date.as_deref(), Some("2025-03-04"));
        assert_eq!(user.country, UNKNOWN);
        assert_eq!(user.plan_type, UNKNOWN);
    }

    #[test]
    fn test_clean_user_bad_date() {
        let user = clean_user(&RawUser {
            user_id: "U0002".to_string(),
            signup_date: Some("someday".to_string()),
            country: Some("AU".to_string()),
            plan_type: Some("Basic".to_string()),
        });
        assert_eq!(user.signup_date, None);
        assert_eq!(user.country, "AU");
    }

    #[test]
    fn test_clean_title() {
        let title = clean_title(&RawTitle {
            title_id: "T0001".to_string(),
            title_name: Some("Title 1".to_string()),
            content_type: Some("Movie".to_string()),
            genre: Some("Docu".to_string()),
            release_year: Some("2019.0".to_string()),
            maturity_rating: None,
        });
        assert_eq!(title.genre, "Documentary");
        assert_eq!(title.release_year, 2019);
        assert_eq!(title.maturity_rating, OTHER);
    }

    #[test]
    fn test_clean_title_bad_year_is_zero() {
        let title = clean_title(&RawTitle {
            title_id: "T0002".to_string(),
            release_year: Some("unknown".to_string()),
            ..Default::default()
        });
        assert_eq!(title.release_year, 0);
        assert_eq!(title.genre, OTHER);
    }
}
