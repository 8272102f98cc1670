//! Trajectory classification of an event sequence.
//!
//! The earliest third of the history is compared against the latest third;
//! the middle is ignored. Ratios are strict: exactly 1.5x or 0.7x is stable.

use super::snapshot::{Domain, EventRecord};

/// Below this many events there is no arc to classify.
const MIN_EVENTS: usize = 3;
const DEEPENING_RATIO: f64 = 1.5;
const EVOLVING_RATIO: f64 = 0.7;

/// Phase of the arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Building,
    Deepening,
    Evolving,
    Stable,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Deepening => "deepening",
            Self::Evolving => "evolving",
            Self::Stable => "stable",
        }
    }
}

/// Trend label of the arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Growing,
    Strengthening,
    Changing,
    Consistent,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Growing => "growing",
            Self::Strengthening => "strengthening",
            Self::Changing => "changing",
            Self::Consistent => "consistent",
        }
    }
}

/// Classified trajectory of an event history.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionProfile {
    pub has_arc: bool,
    pub trend: Trend,
    pub phase: Phase,
    /// "grown more frequent", "become less frequent", "remained steady"
    pub arc_description: String,
    /// "From early connections to deepening relationship"
    pub arc_summary: String,
}

impl Default for EvolutionProfile {
    fn default() -> Self {
        Self {
            has_arc: false,
            trend: Trend::Growing,
            phase: Phase::Building,
            arc_description: String::new(),
            arc_summary: String::new(),
        }
    }
}

/// Classify an event history in any order.
pub fn classify(events: &[EventRecord], domain: Domain) -> EvolutionProfile {
    let n = events.len();
    if n < MIN_EVENTS {
        return EvolutionProfile::default();
    }

    let mut sorted: Vec<&EventRecord> = events.iter().collect();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let third = n / 3;
    let early = &sorted[..third];
    let recent = &sorted[n - third..];

    let phase = phase_for_ratio(early.len(), recent.len());
    let (trend, arc_description) = match phase {
        Phase::Deepening => (Trend::Strengthening, "grown more frequent"),
        Phase::Evolving => (Trend::Changing, "become less frequent"),
        _ => (Trend::Consistent, "remained steady"),
    };

    EvolutionProfile {
        has_arc: true,
        trend,
        phase,
        arc_description: arc_description.to_string(),
        arc_summary: arc_summary(domain, phase),
    }
}

/// Compare the early and recent segment sizes.
pub fn phase_for_ratio(early_len: usize, recent_len: usize) -> Phase {
    let (early, recent) = (early_len as f64, recent_len as f64);
    if recent > DEEPENING_RATIO * early {
        Phase::Deepening
    } else if recent < EVOLVING_RATIO * early {
        Phase::Evolving
    } else {
        Phase::Stable
    }
}

fn arc_summary(domain: Domain, phase: Phase) -> String {
    let phase = phase.as_str();
    match domain {
        Domain::Companion => format!("From early connections to {phase} relationship"),
        Domain::QuestChain => format!("From first steps to {phase} storyline"),
        Domain::SkillTree => format!("From first practice to {phase} mastery"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn events(n: usize) -> Vec<EventRecord> {
        let start = Utc::now() - Duration::days(100);
        (0..n)
            .map(|i| EventRecord::at(start + Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_two_events_have_no_arc() {
        let profile = classify(&events(2), Domain::Companion);
        assert!(!profile.has_arc);
        assert_eq!(profile.phase, Phase::Building);
        assert_eq!(profile.trend, Trend::Growing);
        assert_eq!(profile.arc_description, "");
        assert_eq!(profile.arc_summary, "");
    }

    #[test]
    fn test_three_events_are_classified() {
        let profile = classify(&events(3), Domain::Companion);
        assert!(profile.has_arc);
        // Equal thirds compare as stable
        assert_eq!(profile.phase, Phase::Stable);
        assert_eq!(profile.trend, Trend::Consistent);
        assert_eq!(profile.arc_description, "remained steady");
        assert_eq!(
            profile.arc_summary,
            "From early connections to stable relationship"
        );
    }

    #[test]
    fn test_ratio_boundaries_are_strict() {
        // Exactly 1.5x is not deepening
        assert_eq!(phase_for_ratio(2, 3), Phase::Stable);
        assert_eq!(phase_for_ratio(2, 4), Phase::Deepening);
        // Exactly 0.7x is not evolving
        assert_eq!(phase_for_ratio(10, 7), Phase::Stable);
        assert_eq!(phase_for_ratio(10, 6), Phase::Evolving);
    }

    #[test]
    fn test_equal_slices_from_floor_division() {
        // Both slices always hold floor(n / 3) events, so any sequence
        // long enough to classify comes out stable.
        for n in [3, 4, 5, 9, 10, 31] {
            let profile = classify(&events(n), Domain::SkillTree);
            assert!(profile.has_arc, "n = {n}");
            assert_eq!(profile.phase, Phase::Stable, "n = {n}");
        }
    }

    #[test]
    fn test_domain_wording() {
        let quest = classify(&events(6), Domain::QuestChain);
        assert_eq!(quest.arc_summary, "From first steps to stable storyline");

        let skill = classify(&events(6), Domain::SkillTree);
        assert_eq!(skill.arc_summary, "From first practice to stable mastery");
    }

    #[test]
    fn test_as_str_labels() {
        assert_eq!(Phase::Deepening.as_str(), "deepening");
        assert_eq!(Phase::Evolving.as_str(), "evolving");
        assert_eq!(Trend::Strengthening.as_str(), "strengthening");
        assert_eq!(Trend::Changing.as_str(), "changing");
    }
}
