// src/period.rs
//! Temporal window resolution and the day-count helpers every
//! aggregator clamps against.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

pub const DAY_MS: i64 = 86_400_000;

/// Half-open-at-the-bottom analysis window. `inicio == None` means "no
/// lower bound" (unbounded historical); `fin` is either the literal
/// period end or `now` when the period contains the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPeriod {
    pub inicio: Option<DateTime<Utc>>,
    pub fin: DateTime<Utc>,
}

impl AnalysisPeriod {
    /// Calendar-year window. The current year is clamped to `now`; past
    /// (and future) years get the literal year end.
    pub fn for_year(year: i32, now: DateTime<Utc>) -> Self {
        let fin = if year == now.year() {
            now
        } else {
            end_of_year(year)
        };
        Self {
            inicio: Some(start_of_year(year)),
            fin,
        }
    }

    /// Single-month variant used by the month-scoped consumers.
    pub fn for_month(year: i32, month: u32, now: DateTime<Utc>) -> Self {
        let fin = if year == now.year() && month == now.month() {
            now
        } else {
            end_of_month(year, month)
        };
        Self {
            inicio: Some(start_of_month(year, month)),
            fin,
        }
    }

    pub fn unbounded(fin: DateTime<Utc>) -> Self {
        Self { inicio: None, fin }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts <= self.fin && self.inicio.map_or(true, |inicio| ts >= inicio)
    }

    /// Intersects a span with the window. `None` when the intersection
    /// is empty (the record contributes nothing to this period).
    pub fn clamp(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let lo = match self.inicio {
            Some(inicio) => start.max(inicio),
            None => start,
        };
        let hi = end.min(self.fin);
        if hi < lo {
            None
        } else {
            Some((lo, hi))
        }
    }
}

/// Inclusive day count of a span: `floor(diff_ms / DAY_MS) + 1`.
/// Zero when the span is inverted.
pub fn inclusive_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    if end < start {
        return 0;
    }
    (end - start).num_milliseconds() / DAY_MS + 1
}

/// Ceiling day count of a span, floored at zero. Used for open leave
/// spans where a started day counts whole.
pub fn ceil_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + DAY_MS - 1) / DAY_MS
    }
}

fn start_of_year(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn end_of_year(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 12, 31, 23, 59, 59)
        .single()
        .map(|dt| dt + Duration::milliseconds(999))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn start_of_month(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Last instant (23:59:59.999) of a month, total even for nonsensical
/// month numbers.
pub(crate) fn end_of_month(year: i32, month: u32) -> DateTime<Utc> {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .map(|dt| dt - Duration::milliseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
