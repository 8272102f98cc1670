//! Narrative composer
//!
//! Each insight tier owns a fixed template of literal text and slots. An
//! optional segment wraps a slot with connective wording; when the slot's
//! fragment is empty the whole segment disappears, so "especially ⟨recent⟩"
//! never renders as "especially .".

use std::collections::HashMap;
use Segment::{Optional, Slot as S, Text as T};

/// A named fragment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Name,
    Timeline,
    Recent,
    Magnitude,
    Adjective,
    Scope,
    Guidance,
    Title,
    Impact,
    BondVerb,
    Related,
    ArcSummary,
    ArcDescription,
    Emotion,
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Text(&'static str),
    Slot(Slot),
    /// Dropped together with `before` when the slot is empty
    Optional { before: &'static str, slot: Slot },
}

const fn opt(before: &'static str, slot: Slot) -> Segment {
    Optional { before, slot }
}

/// Computed fragments for one insight
#[derive(Debug, Clone, Default)]
pub struct Fragments(HashMap<Slot, String>);

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: Slot, value: impl Into<String>) -> Self {
        self.0.insert(slot, value.into());
        self
    }

    fn get(&self, slot: Slot) -> &str {
        self.0.get(&slot).map(|s| s.trim()).unwrap_or("")
    }
}

const COMPANION_DEEP: &[Segment] = &[
    T("You and "),
    S(Slot::Name),
    T(" share a deep connection"),
    opt(" that has grown ", Slot::Timeline),
    opt(", felt especially ", Slot::Recent),
    T("."),
];

const COMPANION_GROWING: &[Segment] = &[
    T("Your relationship with "),
    S(Slot::Name),
    T(" is growing"),
    opt(" and has been building ", Slot::Timeline),
    T("."),
];

const SHARED_RICH: &[Segment] = &[
    T("You and "),
    S(Slot::Name),
    T(" have shared "),
    S(Slot::Magnitude),
    opt(" ", Slot::Timeline),
    T(", a history that keeps shaping your story."),
];

const SHARED_BUILDING: &[Segment] = &[
    T("You and "),
    S(Slot::Name),
    T(" have shared "),
    S(Slot::Magnitude),
    T(" so far, with more still to be written."),
];

const DISCOVERY: &[Segment] = &[
    S(Slot::Name),
    T(" is still a mystery waiting to be explored."),
];

const DISCOVERY_SUGGESTION: &[Segment] = &[
    T("What adventure could you share with "),
    S(Slot::Name),
    T(" first?"),
];

const SUPPORT: &[Segment] = &[
    S(Slot::Name),
    T(" has been a "),
    S(Slot::Adjective),
    T(" presence "),
    S(Slot::Scope),
    T(" and has "),
    S(Slot::Guidance),
    T("."),
];

const MENTOR: &[Segment] = &[
    T("As a "),
    S(Slot::Title),
    T(", "),
    S(Slot::Name),
    T(" has "),
    S(Slot::Impact),
    opt(", especially ", Slot::Recent),
    T("."),
];

const FAMILY: &[Segment] = &[
    T("Your family bond with "),
    S(Slot::Name),
    T(" has "),
    S(Slot::BondVerb),
    opt(" ", Slot::Timeline),
    T("."),
];

const COMPANION_ARC: &[Segment] = &[
    S(Slot::ArcSummary),
    T(": your time with "),
    S(Slot::Name),
    T(" has "),
    S(Slot::ArcDescription),
    opt(", marked by moments of ", Slot::Emotion),
    T("."),
];

const QUEST_CONNECTION: &[Segment] = &[
    S(Slot::Name),
    T(" links multiple quests into one connected storyline"),
    opt(", active ", Slot::Recent),
    T("."),
];

const QUEST_MIDWAY: &[Segment] = &[
    T("You are well into "),
    S(Slot::Name),
    T(", past the midpoint of its story"),
    opt(" after journeying ", Slot::Timeline),
    T("."),
];

const QUEST_BEGINNING: &[Segment] = &[
    T("You are at the beginning of "),
    S(Slot::Name),
    T(", with most of its story still ahead."),
];

const QUEST_CONTINUATION: &[Segment] = &[
    T("The next chapter of "),
    S(Slot::Name),
    T(" is waiting for you"),
    opt(", picking up the thread you followed ", Slot::Recent),
    T("."),
];

const QUEST_COMPLETION: &[Segment] = &[
    T("You completed the epic "),
    S(Slot::Name),
    opt(", a journey you carried ", Slot::Timeline),
    T(". It stands as a milestone in your story."),
];

const QUEST_ARC: &[Segment] = &[
    S(Slot::ArcSummary),
    T(": your progress on "),
    S(Slot::Name),
    T(" has "),
    S(Slot::ArcDescription),
    opt(", marked by moments of ", Slot::Emotion),
    T("."),
];

const SKILL_ADVANCED: &[Segment] = &[
    T("Your skill in "),
    S(Slot::Name),
    T(" has reached an advanced level"),
    opt(", honed ", Slot::Timeline),
    T("."),
];

const SKILL_DEVELOPING: &[Segment] = &[
    T("Your skill in "),
    S(Slot::Name),
    T(" is developing with steady practice"),
    opt(", especially ", Slot::Recent),
    T("."),
];

const SKILL_SYNERGY: &[Segment] = &[
    S(Slot::Name),
    T(" works hand in hand with "),
    S(Slot::Related),
    T(", so progress in one lifts the others."),
];

const SKILL_GROWTH: &[Segment] = &[
    T("You are growing toward mastery of "),
    S(Slot::Name),
    opt(", with practice ", Slot::Recent),
    T("."),
];

const SKILL_CONNECTION: &[Segment] = &[
    S(Slot::Name),
    T(" builds on your foundation in "),
    S(Slot::Related),
    T("."),
];

const SKILL_ARC: &[Segment] = &[
    S(Slot::ArcSummary),
    T(": your practice of "),
    S(Slot::Name),
    T(" has "),
    S(Slot::ArcDescription),
    opt(", marked by moments of ", Slot::Emotion),
    T("."),
];

/// Every template the engine can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    CompanionDeep,
    CompanionGrowing,
    SharedRich,
    SharedBuilding,
    Discovery,
    DiscoverySuggestion,
    Support,
    Mentor,
    Family,
    CompanionArc,
    QuestConnection,
    QuestMidway,
    QuestBeginning,
    QuestContinuation,
    QuestCompletion,
    QuestArc,
    SkillAdvanced,
    SkillDeveloping,
    SkillSynergy,
    SkillGrowth,
    SkillConnection,
    SkillArc,
}

impl Template {
    fn segments(&self) -> &'static [Segment] {
        match self {
            Self::CompanionDeep => COMPANION_DEEP,
            Self::CompanionGrowing => COMPANION_GROWING,
            Self::SharedRich => SHARED_RICH,
            Self::SharedBuilding => SHARED_BUILDING,
            Self::Discovery => DISCOVERY,
            Self::DiscoverySuggestion => DISCOVERY_SUGGESTION,
            Self::Support => SUPPORT,
            Self::Mentor => MENTOR,
            Self::Family => FAMILY,
            Self::CompanionArc => COMPANION_ARC,
            Self::QuestConnection => QUEST_CONNECTION,
            Self::QuestMidway => QUEST_MIDWAY,
            Self::QuestBeginning => QUEST_BEGINNING,
            Self::QuestContinuation => QUEST_CONTINUATION,
            Self::QuestCompletion => QUEST_COMPLETION,
            Self::QuestArc => QUEST_ARC,
            Self::SkillAdvanced => SKILL_ADVANCED,
            Self::SkillDeveloping => SKILL_DEVELOPING,
            Self::SkillSynergy => SKILL_SYNERGY,
            Self::SkillGrowth => SKILL_GROWTH,
            Self::SkillConnection => SKILL_CONNECTION,
            Self::SkillArc => SKILL_ARC,
        }
    }

    /// Fill the template from `fragments`.
    pub fn render(&self, fragments: &Fragments) -> String {
        let mut out = String::new();
        for segment in self.segments() {
            match *segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => out.push_str(fragments.get(slot)),
                Segment::Optional { before, slot } => {
                    let value = fragments.get(slot);
                    if !value.is_empty() {
                        out.push_str(before);
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

/// Qualitative phrase for a count of shared experiences.
pub fn experience_magnitude(count: u32) -> &'static str {
    if count >= 20 {
        "many meaningful moments"
    } else if count >= 10 {
        "numerous experiences"
    } else if count >= 5 {
        "several meaningful moments"
    } else {
        "some moments"
    }
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Spell out a small count; anything past ninety-nine is "many".
pub fn number_words(n: i64) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let (tens, ones) = ((n / 10) as usize, (n % 10) as usize);
            if ones == 0 {
                TENS[tens].to_string()
            } else {
                format!("{}-{}", TENS[tens], ONES[ones])
            }
        }
        _ => "many".to_string(),
    }
}

/// "one year", "three months", "many years"
pub fn count_phrase(n: i64, unit: &str) -> String {
    let plural = if n == 1 { "" } else { "s" };
    format!("{} {unit}{plural}", number_words(n))
}
