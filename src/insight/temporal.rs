//! Temporal context: duration, recency and peak-activity phrases derived
//! from an entity's event history.

use super::composer::count_phrase;
use super::snapshot::EventRecord;
use chrono::{DateTime, Datelike, Month, Utc};
use std::collections::BTreeMap;

/// Minimum events in one calendar month for it to count as a peak.
const PEAK_MIN_EVENTS: usize = 3;

/// Phrases describing an entity's history over time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalContext {
    /// "for over one year", "for three months", or empty
    pub timeline_phrase: String,
    /// "this week", "this month", "recently", or empty
    pub recent_activity_phrase: String,
    /// "with peak activity in March 2025"
    pub peak_period_phrase: Option<String>,
    /// The calendar month behind `peak_period_phrase`
    pub peak_period: Option<PeakPeriod>,
}

/// A calendar month with the most activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PeakPeriod {
    pub year: i32,
    pub month: u32,
}

impl PeakPeriod {
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("an earlier month")
    }

    /// Digit-free phrasing relative to `now`.
    pub fn relative_phrase(&self, now: DateTime<Utc>) -> String {
        let month = self.month_name();
        match now.year() - self.year {
            0 => format!("with peak activity in {month}"),
            1 => format!("with peak activity in {month} of last year"),
            _ => format!("with peak activity in {month} some years ago"),
        }
    }
}

/// Derive the temporal context for an event list in any order.
pub fn analyze(events: &[EventRecord], now: DateTime<Utc>) -> TemporalContext {
    if events.is_empty() {
        return TemporalContext::default();
    }

    let mut sorted: Vec<&EventRecord> = events.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let last = sorted[0].timestamp;
    let first = sorted[sorted.len() - 1].timestamp;

    let peak_period = peak_period(&sorted);

    TemporalContext {
        timeline_phrase: timeline_phrase((now - first).num_days()),
        recent_activity_phrase: recency_phrase((now - last).num_days()).to_string(),
        peak_period_phrase: peak_period.map(|p| {
            format!("with peak activity in {} {}", p.month_name(), p.year)
        }),
        peak_period,
    }
}

fn timeline_phrase(days_since_first: i64) -> String {
    if days_since_first > 365 {
        format!("for over {}", count_phrase(days_since_first / 365, "year"))
    } else if days_since_first > 30 {
        format!("for {}", count_phrase(days_since_first / 30, "month"))
    } else {
        String::new()
    }
}

fn recency_phrase(days_since_last: i64) -> &'static str {
    if days_since_last <= 7 {
        "this week"
    } else if days_since_last <= 30 {
        "this month"
    } else if days_since_last <= 90 {
        "recently"
    } else {
        ""
    }
}

/// Busiest calendar month, if it reaches the peak minimum. Equal counts
/// resolve to the most recent month.
fn peak_period(events: &[&EventRecord]) -> Option<PeakPeriod> {
    let mut months: BTreeMap<PeakPeriod, usize> = BTreeMap::new();
    for event in events {
        let key = PeakPeriod {
            year: event.timestamp.year(),
            month: event.timestamp.month(),
        };
        *months.entry(key).or_default() += 1;
    }

    months
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .filter(|(_, count)| *count >= PEAK_MIN_EVENTS)
        .map(|(period, _)| period)
}
