//! View-session repair and validation
//!
//! Each raw session goes through two stages, independently of every other
//! session in the batch:
//!
//! 1. **Repair** (never fails): parse both timestamps and `watch_minutes`,
//!    swap an inverted start/end pair, recompute a missing or negative
//!    duration from usable timestamps, and clear a duration that is still
//!    negative.
//! 2. **Classification**: collect every reject reason that applies to the
//!    repaired state, in a fixed order. No reasons means the session is
//!    clean.
//!
//! Malformed input never aborts a batch; it degrades to an absent value and
//! shows up as a reject reason.

use crate::models::{RawSession, RejectedSession, ValidatedSession};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use viewfact_common::time::{format_timestamp, minutes_between, parse_optional_timestamp};

/// Why a session could not be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    /// Start or end timestamp missing or unparseable
    BadTimestamp,
    /// End still before start after repair
    EndBeforeStart,
    /// Duration missing or unparseable and not recomputable
    BadWatchMinutes,
    /// Duration still negative after repair
    NegativeWatchMinutes,
}

impl RejectReason {
    /// Evaluation order; also the order of codes in a joined reason string
    pub const ALL: [RejectReason; 4] = [
        RejectReason::BadTimestamp,
        RejectReason::EndBeforeStart,
        RejectReason::BadWatchMinutes,
        RejectReason::NegativeWatchMinutes,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::BadTimestamp => "bad_timestamp",
            RejectReason::EndBeforeStart => "end_before_start",
            RejectReason::BadWatchMinutes => "bad_watch_minutes",
            RejectReason::NegativeWatchMinutes => "negative_watch_minutes",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered, duplicate-free set of reject reasons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectReasons(Vec<RejectReason>);

impl RejectReasons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reason, keeping evaluation order regardless of insertion order
    pub fn insert(&mut self, reason: RejectReason) {
        if let Err(pos) = self.0.binary_search(&reason) {
            self.0.insert(pos, reason);
        }
    }

    pub fn contains(&self, reason: RejectReason) -> bool {
        self.0.contains(&reason)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RejectReason> + '_ {
        self.0.iter().copied()
    }

    /// Parse a comma-joined reason string. Unknown codes yield `None`.
    pub fn parse(joined: &str) -> Option<Self> {
        let mut reasons = Self::new();
        for code in joined.split(',').filter(|c| !c.is_empty()) {
            reasons.insert(RejectReason::from_code(code.trim())?);
        }
        Some(reasons)
    }
}

impl fmt::Display for RejectReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reason) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(reason.code())?;
        }
        Ok(())
    }
}

/// Timestamps and duration of a session after the repair stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RepairedFields {
    pub view_start: Option<NaiveDateTime>,
    pub view_end: Option<NaiveDateTime>,
    pub watch_minutes: Option<f64>,
    pub swapped: bool,
    pub recomputed: bool,
    pub cleared: bool,
}

/// Parse a numeric field; blank, unparseable and non-finite values are absent
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse `watch_minutes`. Values too large to store as whole minutes are
/// absent.
pub fn parse_watch_minutes(raw: Option<&str>) -> Option<f64> {
    parse_number(raw).filter(|m| m.abs() < i64::MAX as f64)
}

/// Coerce the `completed` flag to 0/1. Absent or unparseable is 0.
pub fn coerce_completed(raw: Option<&str>) -> u8 {
    match parse_number(raw) {
        Some(v) if v.trunc() != 0.0 => 1,
        _ => 0,
    }
}

/// Round to the nearest whole minute, ties to even
pub fn round_minutes(minutes: f64) -> f64 {
    minutes.round_ties_even()
}

/// Stage 1: apply the swap, recompute and clear rules
pub fn repair(raw: &RawSession) -> RepairedFields {
    let mut fields = RepairedFields {
        view_start: parse_optional_timestamp(raw.view_start.as_deref()),
        view_end: parse_optional_timestamp(raw.view_end.as_deref()),
        watch_minutes: parse_watch_minutes(raw.watch_minutes.as_deref()),
        ..Default::default()
    };

    if let (Some(start), Some(end)) = (fields.view_start, fields.view_end) {
        // Inverted pairs are treated as a logging glitch
        let (start, end) = if end < start {
            fields.view_start = Some(end);
            fields.view_end = Some(start);
            fields.swapped = true;
            (end, start)
        } else {
            (start, end)
        };

        if fields.watch_minutes.map_or(true, |m| m < 0.0) {
            fields.watch_minutes = Some(round_minutes(minutes_between(&start, &end)));
            fields.recomputed = true;
        }
    }

    if fields.watch_minutes.is_some_and(|m| m < 0.0) {
        fields.watch_minutes = None;
        fields.cleared = true;
    }

    fields
}

/// Stage 2: every reason that applies to the repaired state.
///
/// The `end_before_start` and `negative_watch_minutes` checks cannot fire
/// after [`repair`] but are evaluated anyway so classification never relies
/// on repair having run.
pub fn classify(fields: &RepairedFields) -> RejectReasons {
    let mut reasons = RejectReasons::new();

    match (fields.view_start, fields.view_end) {
        (Some(start), Some(end)) => {
            if end < start {
                reasons.insert(RejectReason::EndBeforeStart);
            }
        }
        _ => reasons.insert(RejectReason::BadTimestamp),
    }

    match fields.watch_minutes {
        None => reasons.insert(RejectReason::BadWatchMinutes),
        Some(m) if m < 0.0 => reasons.insert(RejectReason::NegativeWatchMinutes),
        Some(_) => {}
    }

    reasons
}

/// Terminal classification of one session
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Clean(ValidatedSession),
    Rejected(RejectedSession),
}

/// Repair, classify and format a single session
pub fn validate_record(raw: &RawSession) -> Verdict {
    let fields = repair(raw);
    verdict_for(raw, &fields, &classify(&fields))
}

fn verdict_for(raw: &RawSession, fields: &RepairedFields, reasons: &RejectReasons) -> Verdict {
    if reasons.is_empty() {
        if let (Some(start), Some(end), Some(minutes)) =
            (fields.view_start, fields.view_end, fields.watch_minutes)
        {
            return Verdict::Clean(ValidatedSession {
                view_id: raw.view_id.clone(),
                user_id: raw.user_id.clone(),
                title_id: raw.title_id.clone(),
                view_start: format_timestamp(&start),
                view_end: format_timestamp(&end),
                watch_minutes: round_minutes(minutes) as i64,
                completed: coerce_completed(raw.completed.as_deref()),
            });
        }
    }

    if reasons.contains(RejectReason::EndBeforeStart)
        || reasons.contains(RejectReason::NegativeWatchMinutes)
    {
        warn!(
            "Session {} tripped a post-repair check: {}",
            raw.view_id, reasons
        );
    }
    debug!("Rejecting session {}: {}", raw.view_id, reasons);

    Verdict::Rejected(RejectedSession {
        view_id: raw.view_id.clone(),
        user_id: raw.user_id.clone(),
        title_id: raw.title_id.clone(),
        view_start: fields.view_start.as_ref().map(format_timestamp),
        view_end: fields.view_end.as_ref().map(format_timestamp),
        watch_minutes: fields.watch_minutes,
        completed: raw.completed.clone(),
        reject_reason: reasons.to_string(),
    })
}

/// Number of sessions each repair rule touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairCounts {
    pub swapped: usize,
    pub recomputed: usize,
    pub cleared: usize,
}

impl RepairCounts {
    fn record(&mut self, fields: &RepairedFields) {
        self.swapped += usize::from(fields.swapped);
        self.recomputed += usize::from(fields.recomputed);
        self.cleared += usize::from(fields.cleared);
    }

    fn merge(&mut self, other: RepairCounts) {
        self.swapped += other.swapped;
        self.recomputed += other.recomputed;
        self.cleared += other.cleared;
    }
}

/// Stable partition of a batch into clean and rejected sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub clean: Vec<ValidatedSession>,
    pub rejected: Vec<RejectedSession>,
    pub repairs: RepairCounts,
    /// Rejected sessions per reason; a session counts once per reason
    pub reason_counts: BTreeMap<RejectReason, usize>,
}

impl ValidationOutcome {
    pub fn total(&self) -> usize {
        self.clean.len() + self.rejected.len()
    }

    fn extend(&mut self, other: ValidationOutcome) {
        self.clean.extend(other.clean);
        self.rejected.extend(other.rejected);
        self.repairs.merge(other.repairs);
        for (reason, count) in other.reason_counts {
            *self.reason_counts.entry(reason).or_insert(0) += count;
        }
    }

    fn count_reasons(&mut self, reasons: &RejectReasons) {
        for reason in reasons.iter() {
            *self.reason_counts.entry(reason).or_insert(0) += 1;
        }
    }
}

/// Validate a batch. Input order is preserved within each output.
pub fn validate(raw: &[RawSession]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        clean: Vec::with_capacity(raw.len()),
        ..Default::default()
    };

    for session in raw {
        let fields = repair(session);
        outcome.repairs.record(&fields);
        let reasons = classify(&fields);
        outcome.count_reasons(&reasons);
        match verdict_for(session, &fields, &reasons) {
            Verdict::Clean(clean) => outcome.clean.push(clean),
            Verdict::Rejected(rejected) => outcome.rejected.push(rejected),
        }
    }

    outcome
}

/// Validate a batch in fixed-size chunks.
///
/// Produces exactly what [`validate`] produces for the whole batch. A
/// `chunk_size` of 0 processes the batch as a single chunk.
pub fn validate_chunked(raw: &[RawSession], chunk_size: usize) -> ValidationOutcome {
    if chunk_size == 0 {
        return validate(raw);
    }

    raw.chunks(chunk_size)
        .map(validate)
        .fold(ValidationOutcome::default(), |mut acc, chunk| {
            acc.extend(chunk);
            acc
        })
}
