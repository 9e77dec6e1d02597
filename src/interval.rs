//! 4D interval arithmetic
//!
//! An interval string is two ISO dates joined by a hyphen:
//! `YYYY-MM-DD-YYYY-MM-DD`. Splitting is a fixed-offset slice, not a
//! general parser, so both dates must be exactly ten characters. ISO dates
//! compare lexicographically in chronological order, which every function
//! here relies on.
//!
//! The empty string is a valid sentinel meaning "latest cumulative total".

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::types::IntervalMode;

/// Length of an ISO date (`YYYY-MM-DD`).
pub const DATE_LEN: usize = 10;

/// Length of a full interval string.
pub const INTERVAL_LEN: usize = 2 * DATE_LEN + 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// String Operations
// ============================================================================

/// Split an interval into its two date strings (positions 0..10 and 11..21).
pub fn split(interval: &str) -> Option<(&str, &str)> {
    if interval.len() != INTERVAL_LEN {
        return None;
    }
    Some((interval.get(0..DATE_LEN)?, interval.get(DATE_LEN + 1..INTERVAL_LEN)?))
}

pub fn join(date1: &str, date2: &str) -> String {
    format!("{date1}-{date2}")
}

/// Return the interval with its dates in chronological order.
///
/// Strings that are not intervals (including the empty sentinel) are
/// returned unchanged.
pub fn normalize(interval: &str) -> String {
    match split(interval) {
        Some((d1, d2)) if d1 > d2 => join(d2, d1),
        _ => interval.to_string(),
    }
}

/// Parse an ISO date, accepting a trailing time component (`2020-01-01 00:00:00`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(0..DATE_LEN)?;
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// Canonical `YYYY-MM-DD` form of a date cell, `None` when blank or invalid.
pub fn clean_date(s: &str) -> Option<String> {
    parse_date(s).map(|d| d.format(DATE_FORMAT).to_string())
}

/// `YYYYMMDD_YYYYMMDD`, the key used in surface scaling tables.
pub fn compact(interval: &str) -> Option<String> {
    let (d1, d2) = split(interval)?;
    Some(format!("{}_{}", d1.replace('-', ""), d2.replace('-', "")))
}

// ============================================================================
// Typed Interval
// ============================================================================

/// A validated interval, dates kept in the order they were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub first: NaiveDate,
    pub second: NaiveDate,
}

impl Interval {
    pub fn parse(s: &str) -> Result<Self, ViewerError> {
        let invalid = || ViewerError::InvalidInterval(s.to_string());
        let (d1, d2) = split(s).ok_or_else(invalid)?;
        let first = NaiveDate::parse_from_str(d1, DATE_FORMAT).map_err(|_| invalid())?;
        let second = NaiveDate::parse_from_str(d2, DATE_FORMAT).map_err(|_| invalid())?;
        Ok(Self { first, second })
    }

    pub fn is_chronological(&self) -> bool {
        self.first <= self.second
    }

    pub fn normalized(self) -> Self {
        if self.is_chronological() {
            self
        } else {
            Self {
                first: self.second,
                second: self.first,
            }
        }
    }

}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first.format(DATE_FORMAT), self.second.format(DATE_FORMAT))
    }
}

/// Catalog `(t1, t2)` strings for an interval string under the given convention.
///
/// Normal mode writes `t1-t2`; reverse mode writes the monitor date first, `t2-t1`.
pub fn catalog_times(interval: &str, mode: IntervalMode) -> Option<(&str, &str)> {
    let (d1, d2) = split(interval)?;
    Some(match mode {
        IntervalMode::Normal => (d1, d2),
        IntervalMode::Reverse => (d2, d1),
    })
}

/// Render a catalog `(t1, t2)` pair as an interval string.
pub fn render(t1: &str, t2: &str, mode: IntervalMode) -> String {
    match mode {
        IntervalMode::Normal => join(t1, t2),
        IntervalMode::Reverse => join(t2, t1),
    }
}

// ============================================================================
// Date Classification
// ============================================================================

/// Position of a well event date relative to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePosition {
    /// start <= date < end
    Inside,
    /// date >= end
    Greater,
    /// date < start
    Less,
    /// Date missing or not a date
    Unknown,
}

/// Classify `date` against the `[start, end)` bounds of `interval`.
pub fn is_date_within(interval: &str, date: Option<&str>) -> DatePosition {
    let Some(date) = date.and_then(clean_date) else {
        return DatePosition::Unknown;
    };
    let normalized = normalize(interval);
    let Some((start, end)) = split(&normalized) else {
        return DatePosition::Unknown;
    };
    let date = date.as_str();
    if date < start {
        DatePosition::Less
    } else if date < end {
        DatePosition::Inside
    } else {
        DatePosition::Greater
    }
}

// ============================================================================
// Available Intervals
// ============================================================================

/// Intervals present in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableIntervals {
    /// Incremental intervals first, then the rest in lexicographic order
    pub all: Vec<String>,
    /// Intervals spanning two adjacent catalog dates
    pub incremental: Vec<String>,
}

/// Derive the available intervals from catalog `(t1, t2)` pairs.
///
/// Pairs with a blank date (e.g. depth maps without time) are ignored.
pub fn enumerate_available<I, S>(pairs: I, mode: IntervalMode) -> AvailableIntervals
where
    I: IntoIterator<Item = (S, S)>,
    S: AsRef<str>,
{
    let unique: BTreeSet<(String, String)> = pairs
        .into_iter()
        .filter_map(|(t1, t2)| {
            let (t1, t2) = (t1.as_ref().trim(), t2.as_ref().trim());
            (!t1.is_empty() && !t2.is_empty()).then(|| (t1.to_string(), t2.to_string()))
        })
        .collect();

    let mut ordered: Vec<&(String, String)> = unique.iter().collect();
    match mode {
        IntervalMode::Reverse => ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0))),
        IntervalMode::Normal => ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1))),
    }
    let rendered: Vec<String> = ordered.iter().map(|(t1, t2)| render(t1, t2, mode)).collect();
    let present: HashSet<&str> = rendered.iter().map(String::as_str).collect();

    let dates: BTreeSet<&str> = unique
        .iter()
        .flat_map(|(t1, t2)| [t1.as_str(), t2.as_str()])
        .collect();
    let dates: Vec<&str> = dates.into_iter().collect();

    let incremental: Vec<String> = dates
        .windows(2)
        .map(|w| render(w[0], w[1], mode))
        .filter(|candidate| present.contains(candidate.as_str()))
        .collect();

    let mut rest: Vec<&String> = rendered.iter().filter(|i| !incremental.contains(i)).collect();
    rest.sort();

    let mut all = incremental.clone();
    all.extend(rest.into_iter().cloned());

    AvailableIntervals { all, incremental }
}

/// Latest date appearing in any of the intervals.
pub fn last_date<'a, I>(intervals: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    intervals
        .into_iter()
        .filter_map(|i| split(i))
        .flat_map(|(d1, d2)| [d1, d2])
        .max()
        .map(str::to_string)
}

// ============================================================================
// Labels
// ============================================================================

/// Human label for an interval, e.g. `PRM1 - PRM0`.
///
/// `date_labels` maps compact dates (`YYYYMMDD`) to survey names; dates
/// without a label are shown as ISO dates. Labels follow the order the
/// dates are written in.
pub fn plot_label(interval: &str, date_labels: &BTreeMap<String, String>) -> String {
    let Some((d1, d2)) = split(interval) else {
        return interval.to_string();
    };
    let label = |d: &str| {
        let key = d.replace('-', "");
        date_labels.get(&key).cloned().unwrap_or_else(|| d.to_string())
    };
    format!("{} - {}", label(d1), label(d2))
}
