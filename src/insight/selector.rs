//! Threshold-gated insight selection
//!
//! Each metric owns an ordered, mutually exclusive tier table checked from the
//! highest threshold down. Boolean and categorical triggers fire independently
//! of the tiers. Boundaries are inclusive except where noted.

use super::composer::{experience_magnitude, Fragments, Slot, Template};
use super::evolution::EvolutionProfile;
use super::resolver::{join_names, FamilyTone, MentorTone, SupportTone};
use super::snapshot::{CompanionStats, QuestChain, RelationshipClass, SkillTree, StatsSnapshot};
use super::temporal::TemporalContext;
use super::types::InsightType;
use crate::error::Result;

const DEPTH_DEEP: f64 = 70.0;
const DEPTH_GROWING: f64 = 40.0;
const SHARED_RICH: u32 = 10;
const SHARED_BUILDING: u32 = 5;
const SUPPORT_HIGH: f64 = 7.0;
const PROGRESS_MIDWAY: f64 = 50.0;
const PROGRESS_DONE: f64 = 100.0;
const LEVEL_ADVANCED: u32 = 5;
const LEVEL_DEVELOPING: u32 = 3;

/// Everything the resolvers worked out for one entity.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub temporal: TemporalContext,
    /// Digit-free frequency phrase: the relative peak, else recent activity
    pub frequency: String,
    pub evolution: EvolutionProfile,
    pub support: SupportTone,
    pub mentor: MentorTone,
    pub family: FamilyTone,
    pub emotion: Option<String>,
    /// Resolved synergy names, in snapshot order
    pub synergies: Vec<String>,
    /// Resolved prerequisite names, in snapshot order
    pub prerequisites: Vec<String>,
}

/// One chosen insight, ready for composition.
#[derive(Debug, Clone)]
pub struct Selection {
    pub insight_type: InsightType,
    pub template: Template,
    pub fragments: Fragments,
    pub suggestion: Option<Template>,
    /// Tier descriptor, e.g. "deep" or "epic milestone"
    pub significance: &'static str,
}

impl Selection {
    fn new(
        insight_type: InsightType,
        template: Template,
        fragments: Fragments,
        significance: &'static str,
    ) -> Self {
        Self {
            insight_type,
            template,
            fragments,
            suggestion: None,
            significance,
        }
    }

    /// Rendered text for this selection.
    pub fn text(&self) -> String {
        self.template.render(&self.fragments)
    }

    /// Rendered suggestion, if the insight carries one.
    pub fn suggestion_text(&self) -> Option<String> {
        self.suggestion.map(|t| t.render(&self.fragments))
    }
}

/// Select the insights for a snapshot, in evaluation order.
///
/// Fails only when the snapshot itself is malformed.
pub fn select(snapshot: &StatsSnapshot, ctx: &SelectionContext) -> Result<Vec<Selection>> {
    snapshot.validate()?;

    let name = snapshot.entity_name().trim();
    let base = Fragments::new().with(Slot::Name, name);

    Ok(match snapshot {
        StatsSnapshot::Companion(c) => select_companion(c, ctx, base),
        StatsSnapshot::QuestChain(q) => select_quest(q, ctx, base),
        StatsSnapshot::SkillTree(s) => select_skill(s, ctx, base),
    })
}

fn select_companion(c: &CompanionStats, ctx: &SelectionContext, base: Fragments) -> Vec<Selection> {
    let mut out = Vec::new();
    let t = &ctx.temporal;

    if c.relationship_depth >= DEPTH_DEEP {
        let f = base
            .clone()
            .with(Slot::Timeline, &t.timeline_phrase)
            .with(Slot::Recent, &t.recent_activity_phrase);
        out.push(Selection::new(
            InsightType::RelationshipDepth,
            Template::CompanionDeep,
            f,
            "deep",
        ));
    } else if c.relationship_depth >= DEPTH_GROWING {
        let f = base.clone().with(Slot::Timeline, &t.timeline_phrase);
        out.push(Selection::new(
            InsightType::RelationshipDepth,
            Template::CompanionGrowing,
            f,
            "growing",
        ));
    }

    if c.shared_experiences == 0 {
        let mut discovery = Selection::new(
            InsightType::Discovery,
            Template::Discovery,
            base.clone(),
            "undiscovered",
        );
        discovery.suggestion = Some(Template::DiscoverySuggestion);
        out.push(discovery);
    } else if c.shared_experiences >= SHARED_RICH {
        let f = base
            .clone()
            .with(Slot::Magnitude, experience_magnitude(c.shared_experiences))
            .with(Slot::Timeline, &t.timeline_phrase);
        out.push(Selection::new(
            InsightType::SharedExperiences,
            Template::SharedRich,
            f,
            "rich shared history",
        ));
    } else if c.shared_experiences >= SHARED_BUILDING {
        let f = base
            .clone()
            .with(Slot::Magnitude, experience_magnitude(c.shared_experiences));
        out.push(Selection::new(
            InsightType::SharedExperiences,
            Template::SharedBuilding,
            f,
            "growing shared history",
        ));
    }

    if c.support_level >= SUPPORT_HIGH {
        let f = base
            .clone()
            .with(Slot::Adjective, ctx.support.adjective)
            .with(Slot::Scope, ctx.support.scope)
            .with(Slot::Guidance, ctx.support.guidance);
        out.push(Selection::new(
            InsightType::Support,
            Template::Support,
            f,
            "steadfast support",
        ));
    }

    match c.relationship_class {
        RelationshipClass::Mentor => {
            let f = base
                .clone()
                .with(Slot::Title, ctx.mentor.title)
                .with(Slot::Impact, ctx.mentor.impact)
                .with(Slot::Recent, &t.recent_activity_phrase);
            out.push(Selection::new(
                InsightType::Support,
                Template::Mentor,
                f,
                "mentorship",
            ));
        }
        RelationshipClass::Family => {
            let f = base
                .clone()
                .with(Slot::BondVerb, ctx.family.bond_verb)
                .with(Slot::Timeline, &ctx.family.timeline);
            out.push(Selection::new(
                InsightType::Evolution,
                Template::Family,
                f,
                "family bond",
            ));
        }
        _ => {}
    }

    if let Some(arc) = arc(ctx, base, Template::CompanionArc, InsightType::Evolution) {
        out.push(arc);
    }
    out
}

fn select_quest(q: &QuestChain, ctx: &SelectionContext, base: Fragments) -> Vec<Selection> {
    let mut out = Vec::new();
    let t = &ctx.temporal;

    if q.quest_ids.len() > 1 {
        let f = base.clone().with(Slot::Recent, &t.recent_activity_phrase);
        out.push(Selection::new(
            InsightType::Connection,
            Template::QuestConnection,
            f,
            "connected storyline",
        ));
    }

    // Upper bound is strict: a finished storyline has no progress tier.
    if q.storyline_progress >= PROGRESS_MIDWAY && q.storyline_progress < PROGRESS_DONE {
        let f = base.clone().with(Slot::Timeline, &t.timeline_phrase);
        out.push(Selection::new(
            InsightType::Progress,
            Template::QuestMidway,
            f,
            "midway",
        ));
    } else if q.storyline_progress < PROGRESS_MIDWAY {
        out.push(Selection::new(
            InsightType::Progress,
            Template::QuestBeginning,
            base.clone(),
            "beginning",
        ));
    }

    if q.storyline_progress < PROGRESS_DONE {
        let f = base.clone().with(Slot::Recent, &t.recent_activity_phrase);
        out.push(Selection::new(
            InsightType::Continuation,
            Template::QuestContinuation,
            f,
            "unfinished",
        ));
    }

    if q.epic_completion {
        let f = base.clone().with(Slot::Timeline, &t.timeline_phrase);
        out.push(Selection::new(
            InsightType::Completion,
            Template::QuestCompletion,
            f,
            "epic milestone",
        ));
    }

    if let Some(arc) = arc(ctx, base, Template::QuestArc, InsightType::Narrative) {
        out.push(arc);
    }
    out
}

fn select_skill(s: &SkillTree, ctx: &SelectionContext, base: Fragments) -> Vec<Selection> {
    let mut out = Vec::new();
    let t = &ctx.temporal;

    if s.current_level >= LEVEL_ADVANCED {
        let f = base.clone().with(Slot::Timeline, &t.timeline_phrase);
        out.push(Selection::new(
            InsightType::Progression,
            Template::SkillAdvanced,
            f,
            "advanced",
        ));
    } else if s.current_level >= LEVEL_DEVELOPING {
        let f = base.clone().with(Slot::Recent, &t.recent_activity_phrase);
        out.push(Selection::new(
            InsightType::Progression,
            Template::SkillDeveloping,
            f,
            "developing",
        ));
    }

    // Ids that resolved to no name do not count.
    if !s.synergies.is_empty() && !ctx.synergies.is_empty() {
        let f = base.clone().with(Slot::Related, join_names(&ctx.synergies));
        out.push(Selection::new(
            InsightType::Synergy,
            Template::SkillSynergy,
            f,
            "synergy",
        ));
    }

    if s.mastery_level > 0 {
        let f = base.clone().with(Slot::Recent, &t.recent_activity_phrase);
        out.push(Selection::new(
            InsightType::Growth,
            Template::SkillGrowth,
            f,
            "growing mastery",
        ));
    }

    if !s.prerequisites.is_empty() && !ctx.prerequisites.is_empty() {
        let f = base
            .clone()
            .with(Slot::Related, join_names(&ctx.prerequisites));
        out.push(Selection::new(
            InsightType::Connection,
            Template::SkillConnection,
            f,
            "foundation",
        ));
    }

    if let Some(arc) = arc(ctx, base, Template::SkillArc, InsightType::Temporal) {
        out.push(arc);
    }
    out
}

fn arc(
    ctx: &SelectionContext,
    base: Fragments,
    template: Template,
    insight_type: InsightType,
) -> Option<Selection> {
    let evolution = &ctx.evolution;
    if !evolution.has_arc {
        return None;
    }
    let f = base
        .with(Slot::ArcSummary, &evolution.arc_summary)
        .with(Slot::ArcDescription, &evolution.arc_description)
        .with(Slot::Emotion, ctx.emotion.as_deref().unwrap_or(""));
    Some(Selection::new(
        insight_type,
        template,
        f,
        evolution.trend.as_str(),
    ))
}
