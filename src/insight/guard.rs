//! Number leak guard
//!
//! Last line of defence before records leave the engine. Scans every
//! narrative field for decimal digit runs and drops records that reproduce a
//! source magnitude or the raw event count. In strict mode any digit run is
//! a leak. Names the user wrote themselves (the entity's own name and any
//! resolved related names) are masked before scanning.

use super::snapshot::StatsSnapshot;
use super::types::InsightRecord;
use crate::config::GuardConfig;
use crate::error::{Error, Result};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;

const DIGIT_RUN: &str = r"\d+(?:\.\d+)?";

/// Values a record must not reproduce, plus the user-authored names that
/// are exempt from scanning.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenValues {
    values: HashSet<String>,
    names: Vec<String>,
}

impl ForbiddenValues {
    /// Collect the magnitudes of a snapshot plus the raw event count.
    pub fn from_snapshot(snapshot: &StatsSnapshot, event_count: usize) -> Self {
        let mut values = HashSet::new();
        for m in snapshot.magnitudes() {
            if !m.is_finite() {
                continue;
            }
            values.insert(format!("{}", m.trunc() as i64));
            values.insert(format!("{}", m.round() as i64));
            if m.fract() != 0.0 {
                values.insert(format!("{m}"));
            }
        }
        values.insert(event_count.to_string());
        Self {
            values,
            names: Vec::new(),
        }
    }

    /// Exempt names from scanning. Longer names are masked first so one name
    /// containing another is removed whole.
    pub fn with_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        self.names.extend(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty()),
        );
        self.names
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self.names.dedup();
        self
    }

    pub fn contains(&self, run: &str) -> bool {
        self.values.contains(run)
    }

    fn mask<'a>(&self, field: &'a str) -> Cow<'a, str> {
        let mut masked = Cow::Borrowed(field);
        for name in &self.names {
            if masked.contains(name.as_str()) {
                masked = Cow::Owned(masked.replace(name.as_str(), " "));
            }
        }
        masked
    }
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leak {
    pub field: &'static str,
    pub run: String,
}

/// Scans finished records for leaked numbers.
#[derive(Debug)]
pub struct LeakGuard {
    pattern: Regex,
    enabled: bool,
    strict: bool,
}

impl LeakGuard {
    pub fn new(config: &GuardConfig) -> Result<Self> {
        let pattern = Regex::new(DIGIT_RUN)
            .map_err(|e| Error::Internal(format!("Invalid digit pattern: {}", e)))?;
        Ok(Self {
            pattern,
            enabled: config.enabled,
            strict: config.strict_digits,
        })
    }

    /// First leak found in `record`, if any.
    pub fn inspect(&self, record: &InsightRecord, forbidden: &ForbiddenValues) -> Option<Leak> {
        const FIELDS: [&str; 6] = [
            "text",
            "suggestion",
            "timeline",
            "evolution",
            "frequency",
            "significance",
        ];
        let ctx = record.story_context.as_ref();
        let values = [
            Some(record.text.as_str()),
            record.suggestion.as_deref(),
            ctx.and_then(|c| c.timeline.as_deref()),
            ctx.and_then(|c| c.evolution.as_deref()),
            ctx.and_then(|c| c.frequency.as_deref()),
            ctx.and_then(|c| c.significance.as_deref()),
        ];

        for (field, value) in FIELDS.into_iter().zip(values) {
            let Some(value) = value else { continue };
            let value = forbidden.mask(value);
            for m in self.pattern.find_iter(&value) {
                let run = m.as_str();
                let integral = run.split('.').next().unwrap_or(run);
                if self.strict || forbidden.contains(run) || forbidden.contains(integral) {
                    return Some(Leak {
                        field,
                        run: run.to_string(),
                    });
                }
            }
        }
        None
    }

    /// Drop leaking records, keeping the order of the rest.
    pub fn filter(
        &self,
        records: Vec<InsightRecord>,
        forbidden: &ForbiddenValues,
    ) -> Vec<InsightRecord> {
        if !self.enabled {
            return records;
        }
        records
            .into_iter()
            .filter(|record| match self.inspect(record, forbidden) {
                None => true,
                Some(leak) => {
                    tracing::warn!(
                        entity_id = %record.entity_id,
                        insight_type = record.insight_type.as_str(),
                        field = leak.field,
                        "Dropping insight that leaks a raw number"
                    );
                    false
                }
            })
            .collect()
    }
}
