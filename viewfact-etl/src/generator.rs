//! Synthetic raw data generator
//!
//! Produces users, titles and viewing sessions with the kinds of defects the
//! validator has to cope with: negative durations, inverted timestamps and,
//! at `corruption_rate`, blanked or garbled fields. Output is fully
//! determined by the seed and the requested sizes.

use crate::io::RawInputs;
use crate::models::{RawSession, RawTitle, RawUser};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use viewfact_common::config::GeneratorConfig;
use viewfact_common::time::{format_date, format_timestamp};

const COUNTRIES: [&str; 6] = ["AU", "US", "IN", "UK", "CA", "NZ"];
const PLANS: [&str; 3] = ["Basic", "Standard", "Premium"];
const CONTENT_TYPES: [&str; 2] = ["Movie", "Series"];
const GENRES_RAW: [&str; 8] = [
    "SciFi",
    "Science Fiction",
    "Sci-Fi",
    "Drama",
    "Comedy",
    "Thriller",
    "Docu",
    "Documentary",
];
const RATINGS_RAW: [&str; 7] = ["PG13", "PG-13", "pg-13", "TVMA", "TV-MA", "G", "R"];

/// Share of sessions whose end is logged before their start
const INVERTED_RATE: f64 = 0.03;

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn epoch(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn make_users<R: Rng>(rng: &mut R, n: usize) -> Vec<RawUser> {
    let start = epoch(2025, 1, 1).date();
    (1..=n)
        .map(|i| {
            let signup = start + Duration::days(rng.gen_range(0..=365));
            RawUser {
                user_id: format!("U{:04}", i),
                signup_date: Some(format_date(&signup)),
                country: Some(pick(rng, &COUNTRIES).to_string()),
                plan_type: Some(pick(rng, &PLANS).to_string()),
            }
        })
        .collect()
}

fn make_titles<R: Rng>(rng: &mut R, n: usize) -> Vec<RawTitle> {
    (1..=n)
        .map(|i| RawTitle {
            title_id: format!("T{:04}", i),
            title_name: Some(format!("Title {}", i)),
            content_type: Some(pick(rng, &CONTENT_TYPES).to_string()),
            genre: Some(pick(rng, &GENRES_RAW).to_string()),
            release_year: Some(rng.gen_range(1985..=2025i32).to_string()),
            maturity_rating: Some(pick(rng, &RATINGS_RAW).to_string()),
        })
        .collect()
}

/// Damage one field of a session
fn corrupt<R: Rng>(rng: &mut R, session: &mut RawSession) {
    match rng.gen_range(0..5u8) {
        0 => session.view_start = None,
        1 => session.view_end = Some("not-a-time".to_string()),
        2 => session.watch_minutes = None,
        3 => session.watch_minutes = Some("n/a".to_string()),
        _ => session.completed = None,
    }
}

fn make_views<R: Rng>(
    rng: &mut R,
    users: &[RawUser],
    titles: &[RawTitle],
    n: usize,
    corruption_rate: f64,
) -> Vec<RawSession> {
    if users.is_empty() || titles.is_empty() {
        warn!("No users or titles to reference, skipping view generation");
        return Vec::new();
    }

    let base = epoch(2026, 1, 1);
    (1..=n)
        .map(|i| {
            let user = &users[rng.gen_range(0..users.len())];
            let title = &titles[rng.gen_range(0..titles.len())];

            let start = base
                + Duration::days(rng.gen_range(0..=35))
                + Duration::minutes(rng.gen_range(0..=1440));
            let watch: i64 = rng.gen_range(-10..=180);
            let mut end = start + Duration::minutes(watch);

            if rng.gen_bool(INVERTED_RATE) {
                end = start - Duration::minutes(rng.gen_range(1..=60));
            }

            let completed = u8::from(watch >= 60 && rng.gen_bool(0.6));

            let mut session = RawSession {
                view_id: format!("V{:06}", i),
                user_id: user.user_id.clone(),
                title_id: title.title_id.clone(),
                view_start: Some(format_timestamp(&start)),
                view_end: Some(format_timestamp(&end)),
                watch_minutes: Some(watch.to_string()),
                completed: Some(completed.to_string()),
            };

            if rng.gen_bool(corruption_rate) {
                corrupt(rng, &mut session);
            }

            session
        })
        .collect()
}

/// Generate a full raw dataset
pub fn generate(config: &GeneratorConfig) -> RawInputs {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let corruption_rate = if config.corruption_rate.is_finite() {
        config.corruption_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let users = make_users(&mut rng, config.users);
    let titles = make_titles(&mut rng, config.titles);
    let sessions = make_views(&mut rng, &users, &titles, config.views, corruption_rate);

    info!(
        "Generated {} users, {} titles, {} views (seed {})",
        users.len(),
        titles.len(),
        sessions.len(),
        config.seed
    );

    RawInputs {
        users,
        titles,
        sessions,
    }
}
