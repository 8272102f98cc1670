//! Domain context resolvers
//!
//! Every store read goes through [`lookup`], which bounds it with a timeout
//! and turns failure into an explicit [`Lookup::Defaulted`] carrying the
//! documented default. The tone types are pure functions of what was read.

use super::composer::count_phrase;
use super::snapshot::EventRecord;
use crate::error::Result;
use crate::store::LoreStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Why a lookup fell back to its default
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// The store returned an error
    Failed(String),
    /// The store did not answer in time
    TimedOut,
}

/// Outcome of a store read: the value, or the default that replaced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Defaulted { value: T, reason: Fallback },
}

impl<T> Lookup<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Found(v) | Self::Defaulted { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Found(v) | Self::Defaulted { value: v, .. } => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    /// Transform the value, keeping the found/defaulted tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(v) => Lookup::Found(f(v)),
            Self::Defaulted { value, reason } => Lookup::Defaulted {
                value: f(value),
                reason,
            },
        }
    }
}

/// Run a store read under a timeout, substituting `T::default()` on error
/// or timeout.
pub async fn lookup<T, F>(what: &'static str, timeout: Duration, read: F) -> Lookup<T>
where
    T: Default,
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, read).await {
        Ok(Ok(value)) => Lookup::Found(value),
        Ok(Err(e)) => {
            tracing::warn!(lookup = what, error = %e, "Lookup failed, using default");
            Lookup::Defaulted {
                value: T::default(),
                reason: Fallback::Failed(e.to_string()),
            }
        }
        Err(_) => {
            tracing::warn!(
                lookup = what,
                timeout_ms = millis(timeout),
                "Lookup timed out, using default"
            );
            Lookup::Defaulted {
                value: T::default(),
                reason: Fallback::TimedOut,
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Read an entity's events under the lookup policy.
pub async fn load_events<S: LoreStore + ?Sized>(
    store: &S,
    user_id: &str,
    entity_id: &str,
    timeout: Duration,
) -> Lookup<Vec<EventRecord>> {
    lookup("events", timeout, store.list_events(user_id, entity_id)).await
}

/// Resolve related entity ids to display names, in input order.
///
/// Unknown ids are skipped. A failing id is skipped too and marks the whole
/// result as defaulted.
pub async fn resolve_names<S: LoreStore + ?Sized>(
    store: &S,
    user_id: &str,
    ids: &[String],
    timeout: Duration,
) -> Lookup<Vec<String>> {
    let mut names = Vec::with_capacity(ids.len());
    let mut fallback = None;

    for id in ids {
        match lookup("name", timeout, store.resolve_name(user_id, id)).await {
            Lookup::Found(Some(name)) if !name.trim().is_empty() => names.push(name),
            Lookup::Found(_) => {}
            Lookup::Defaulted { reason, .. } => fallback = Some(reason),
        }
    }

    match fallback {
        None => Lookup::Found(names),
        Some(reason) => Lookup::Defaulted {
            value: names,
            reason,
        },
    }
}

/// Join names as natural-language prose: "a", "a and b", "a, b, and c".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

/// Tone of a supportive companion, read from recent role-tagged events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportTone {
    pub adjective: &'static str,
    pub scope: &'static str,
    pub guidance: &'static str,
}

impl Default for SupportTone {
    fn default() -> Self {
        Self {
            adjective: "supportive",
            scope: "in important moments",
            guidance: "offered guidance when it mattered",
        }
    }
}

impl SupportTone {
    /// `window` most recent events; a role matches when it contains any of
    /// `roles`, case-insensitively.
    pub fn from_events(events: &[EventRecord], window: usize, roles: &[String]) -> Self {
        let mut recent: Vec<&EventRecord> = events.iter().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(window);

        let role_matches = recent
            .iter()
            .filter_map(|e| e.role.as_deref())
            .map(str::to_lowercase)
            .filter(|role| roles.iter().any(|r| role.contains(&r.to_lowercase())))
            .count();

        let default = Self::default();
        Self {
            adjective: if role_matches >= 3 {
                "deeply supportive"
            } else {
                default.adjective
            },
            scope: if recent.len() >= 5 {
                "throughout your journey"
            } else {
                default.scope
            },
            guidance: if role_matches >= 2 {
                "stepped in to guide you again and again"
            } else {
                default.guidance
            },
        }
    }
}

/// Tone of a mentor relationship, read from the total event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentorTone {
    pub title: &'static str,
    pub impact: &'static str,
}

impl Default for MentorTone {
    fn default() -> Self {
        Self {
            title: "supportive mentor",
            impact: "helped you find your footing",
        }
    }
}

impl MentorTone {
    pub fn from_event_count(count: usize) -> Self {
        let default = Self::default();
        Self {
            title: if count >= 10 {
                "trusted mentor"
            } else {
                default.title
            },
            impact: if count >= 15 {
                "shaped how you meet every challenge"
            } else {
                default.impact
            },
        }
    }
}

/// Tone of a family bond, read from the first-appearance date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyTone {
    pub timeline: String,
    pub bond_verb: &'static str,
}

impl Default for FamilyTone {
    fn default() -> Self {
        Self {
            timeline: String::new(),
            bond_verb: "grown",
        }
    }
}

impl FamilyTone {
    pub fn from_first_appearance(first: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(first) = first else {
            return Self::default();
        };

        let years = (now - first).num_days() / 365;
        if years >= 1 {
            Self {
                timeline: format!("for over {}", count_phrase(years, "year")),
                bond_verb: "deepened",
            }
        } else {
            Self::default()
        }
    }
}

/// Dominant emotion across an entity's events, if one recurs.
pub fn dominant_emotion(events: &[EventRecord]) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for emotion in events.iter().filter_map(|e| e.emotion.as_deref()) {
        let emotion = emotion.trim().to_lowercase();
        if !emotion.is_empty() {
            *counts.entry(emotion).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        // Highest count first, then alphabetical
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(emotion, _)| emotion)
}
